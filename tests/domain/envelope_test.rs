use docstream::domain::{DocumentReference, InboundEnvelope, OutboundEnvelope, SourceKind};

#[test]
fn given_full_inbound_json_when_deserializing_then_fields_mapped() {
    let json = r#"{"type":"HDFS","url":"hdfs://nn/a.pdf","inputStream":"in","outputStream":"out"}"#;

    let envelope: InboundEnvelope = serde_json::from_str(json).unwrap();

    assert_eq!(envelope.source_type, "HDFS");
    assert_eq!(envelope.url.as_deref(), Some("hdfs://nn/a.pdf"));
    assert_eq!(envelope.input_stream.as_deref(), Some("in"));
    assert_eq!(envelope.output_stream.as_deref(), Some("out"));
}

#[test]
fn given_inbound_json_without_optional_fields_when_deserializing_then_defaults() {
    let envelope: InboundEnvelope = serde_json::from_str(r#"{"type":"FTP"}"#).unwrap();

    assert_eq!(envelope.source_type, "FTP");
    assert!(envelope.url.is_none());
    assert!("FTP".parse::<SourceKind>().is_err());
}

#[test]
fn given_outbound_envelope_when_serializing_then_camel_case_wire_shape() {
    let envelope = OutboundEnvelope::processed(
        SourceKind::Hdfs,
        "hdfs://nn/processed/a.pdf.txt".to_string(),
        DocumentReference::new("hdfs://nn/incoming/a.pdf"),
    );

    let value: serde_json::Value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "type": "HDFS",
            "url": "hdfs://nn/processed/a.pdf.txt",
            "processed": true,
            "originalFile": "hdfs://nn/incoming/a.pdf"
        })
    );
}

#[test]
fn given_source_kind_aliases_when_parsing_then_normalised() {
    assert_eq!("https".parse::<SourceKind>(), Ok(SourceKind::Http));
    assert_eq!(" file ".parse::<SourceKind>(), Ok(SourceKind::File));
    assert_eq!("hdfs".parse::<SourceKind>(), Ok(SourceKind::Hdfs));
}
