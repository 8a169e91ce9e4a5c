use crate::error::Result;
use crate::parsers::RawDocument;

/// Something that can produce the body of a numbered review page
#[allow(async_fn_in_trait)]
pub trait PageSource {
    /// Fetch page `page` (1-based); non-200 answers are `Error::Status`
    async fn fetch_page(&self, page: u32) -> Result<RawDocument>;
}
