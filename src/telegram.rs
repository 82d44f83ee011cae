use bytes::{Bytes, BytesMut};
use tracing::{debug, instrument};

use crate::client::Client;
use crate::coordinator::Call;
use crate::error::Result;

/// A telegram ends with `!`, a 4 digit hex CRC and CRLF
const END_MARKER: u8 = b'!';
const END_MARKER_OFFSET: usize = 7;

/// Raw P1 telegram as received from the smart meter
#[derive(Default, Debug, Clone, PartialEq)]
pub struct P1Telegram {
    pub data: Bytes,
}

impl P1Telegram {
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Whether `page` holds the end of a telegram
fn ends_telegram(page: &[u8]) -> bool {
    page.len() >= END_MARKER_OFFSET && page[page.len() - END_MARKER_OFFSET] == END_MARKER
}

impl Client {
    /// Reads the last P1 telegram, collecting as many pages as it spans
    #[instrument(skip(self), fields(client = %self.config().name))]
    pub async fn p1_telegram(&self) -> Result<P1Telegram> {
        let mut data = BytesMut::new();
        let mut page_no = 1u32;
        loop {
            let page = self.execute(Call::get(format!("V?p={page_no}"))).await?;
            if page.is_empty() {
                break;
            }

            let at_end = ends_telegram(&page);
            if at_end && page_no == 1 {
                // single page telegram, no need to copy
                return Ok(P1Telegram { data: page });
            }
            data.extend_from_slice(&page);
            if at_end {
                break;
            }
            page_no += 1;
        }
        debug!(pages = page_no, len = data.len(), "read telegram");
        Ok(P1Telegram {
            data: data.freeze(),
        })
    }
}
