//! Splits a concatenated MJPEG byte stream into JPEG frames.

use bytes::Bytes;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Partial frames larger than this are dropped.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Incremental frame splitter.
#[derive(Debug, Default)]
pub struct MjpegSplitter {
    buf: Vec<u8>,
}

impl MjpegSplitter {
    /// Creates an empty splitter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds `chunk` and returns the newest frame completed by it.
    ///
    /// Older frames completed by the same chunk are skipped.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        self.buf.extend_from_slice(chunk);
        let mut latest = None;

        loop {
            let Some(start) = find_marker(&self.buf, SOI, 0) else {
                // A trailing 0xFF may be the first half of the next SOI.
                let keep = usize::from(self.buf.last() == Some(&0xFF));
                let cut = self.buf.len() - keep;
                self.buf.drain(..cut);
                break;
            };
            let Some(end) = find_marker(&self.buf, EOI, start + SOI.len()) else {
                self.buf.drain(..start);
                if self.buf.len() > MAX_FRAME_BYTES {
                    self.buf.clear();
                }
                break;
            };

            let frame_end = end + EOI.len();
            latest = Some(Bytes::copy_from_slice(&self.buf[start..frame_end]));
            self.buf.drain(..frame_end);
        }

        latest
    }

    /// Returns the number of buffered bytes.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

fn find_marker(haystack: &[u8], marker: [u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(2)
        .position(|w| w == marker)
        .map(|pos| pos + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut out = SOI.to_vec();
        out.extend_from_slice(body);
        out.extend_from_slice(&EOI);
        out
    }

    #[test]
    fn test_single_frame() {
        let mut splitter = MjpegSplitter::new();
        let data = frame(&[1, 2, 3]);

        assert_eq!(splitter.push(&data).as_deref(), Some(data.as_slice()));
        assert_eq!(splitter.buffered(), 0);
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut splitter = MjpegSplitter::new();
        let data = frame(&[9; 32]);
        let (a, b) = data.split_at(17);

        assert!(splitter.push(a).is_none());
        assert_eq!(splitter.push(b).as_deref(), Some(data.as_slice()));
    }

    #[test]
    fn test_marker_split_across_chunks() {
        let mut splitter = MjpegSplitter::new();
        let data = frame(&[4, 5]);

        assert!(splitter.push(&[0x00, 0xFF]).is_none());
        assert_eq!(splitter.push(&data[1..]).as_deref(), Some(data.as_slice()));
    }

    #[test]
    fn test_keeps_newest_of_many() {
        let mut splitter = MjpegSplitter::new();
        let first = frame(&[1]);
        let second = frame(&[2]);
        let third = frame(&[3]);
        let mut chunk = [first, second.clone()].concat();
        chunk.extend_from_slice(&third[..2]);

        assert_eq!(splitter.push(&chunk).as_deref(), Some(second.as_slice()));
        assert_eq!(splitter.buffered(), 2);
    }

    #[test]
    fn test_garbage_is_discarded() {
        let mut splitter = MjpegSplitter::new();
        assert!(splitter.push(&[0x10, 0x20, 0x30]).is_none());
        assert_eq!(splitter.buffered(), 0);
    }
}
