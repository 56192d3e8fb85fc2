/// One bounded piece of a document's extracted text.
///
/// `index` is 0-based and contiguous across every segment of the document;
/// `total` is the chunk count of the whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub index: usize,
    pub total: usize,
    pub segment: usize,
    pub text: String,
}

impl TextChunk {
    pub fn new(index: usize, total: usize, segment: usize, text: String) -> Self {
        Self {
            index,
            total,
            segment,
            text,
        }
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.total
    }
}
