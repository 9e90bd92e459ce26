use std::io::Read;
use std::str::FromStr;
use std::time::Duration;

use crate::hashing::{Hash, HASH_HEX_LEN};
use crate::pkt;
use crate::{Error, Result};

const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";
const SERVICE_ANNOUNCEMENT: &[u8] = b"# service=git-upload-pack\n";
const REQUEST_CONTENT_TYPE: &str = "application/x-git-upload-pack-request";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// A remote repository reachable over the smart HTTP protocol.
pub struct RemoteRepository {
    url: String,
    client: reqwest::blocking::Client,
}

impl RemoteRepository {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(RemoteRepository {
            url: url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Performs reference discovery and returns the commit the remote's HEAD
    /// points at.
    ///
    /// # Errors
    ///
    /// A non-success HTTP status is a transport error; a response that does
    /// not follow the advertisement format is a protocol error.
    pub fn discover_head(&self) -> Result<Hash> {
        let url = format!("{}/info/refs?service={}", self.url, UPLOAD_PACK_SERVICE);
        log::debug!("reference discovery: {}", url);

        let response = self.client.get(url).send()?.error_for_status()?;
        let body = response.bytes()?;

        parse_advertisement(&mut body.as_ref())
    }

    /// Negotiates a packfile for `want` and returns its raw bytes.
    ///
    /// The request body asks for a single commit and declares nothing as
    /// already present, so the server answers with a NAK followed by a
    /// self-contained pack.
    pub fn fetch_pack(&self, want: &Hash) -> Result<Vec<u8>> {
        let url = format!("{}/{}", self.url, UPLOAD_PACK_SERVICE);
        log::debug!("pack negotiation: {}", url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", REQUEST_CONTENT_TYPE)
            .body(negotiation_body(want))
            .send()?
            .error_for_status()?;
        let body = response.bytes()?;

        strip_ack(body.as_ref())
    }
}

/// Builds the upload-pack request: a want line, a flush and `done`.
fn negotiation_body(want: &Hash) -> Vec<u8> {
    let mut body = pkt::encode(format!("want {} no-progress\n", want).as_bytes());
    body.extend(pkt::flush());
    body.extend(pkt::encode(b"done\n"));
    body
}

/// Parses the reference advertisement: the service announcement line, a
/// flush, then `<sha> HEAD\0<capabilities>`. Only the leading hash of the
/// head line is of interest.
fn parse_advertisement<R: Read>(reader: &mut R) -> Result<Hash> {
    let announcement = pkt::read(reader)?.data()?;
    if announcement != SERVICE_ANNOUNCEMENT {
        return Err(Error::protocol(format!(
            "unexpected service announcement: {:?}",
            String::from_utf8_lossy(&announcement)
        )));
    }

    if pkt::read(reader)? != pkt::PktLine::Flush {
        return Err(Error::protocol(
            "expected a flush after the service announcement",
        ));
    }

    let head_line = pkt::read(reader)?.data()?;
    if head_line.len() < HASH_HEX_LEN {
        return Err(Error::protocol(
            "advertisement head line is too short to carry a hash",
        ));
    }
    let hash_str = std::str::from_utf8(&head_line[..HASH_HEX_LEN])
        .map_err(|_| Error::protocol("advertised head hash is not valid text"))?;

    Hash::from_str(hash_str).map_err(|_| {
        Error::protocol(format!("advertised head hash {:?} is not hex", hash_str))
    })
}

/// Drops the leading ACK/NAK packet line of an upload-pack response and
/// returns everything after it, the packfile bytes.
fn strip_ack(body: &[u8]) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(body);
    let ack = pkt::read(&mut cursor)
        .and_then(pkt::PktLine::data)
        .map_err(|_| Error::protocol("upload-pack response did not start with ACK or NAK"))?;

    if !(ack.starts_with(b"ACK") || ack.starts_with(b"NAK")) {
        return Err(Error::protocol(format!(
            "expected ACK or NAK, got {:?}",
            String::from_utf8_lossy(&ack)
        )));
    }

    Ok(body[cursor.position() as usize..].to_vec())
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_HEAD_SHA: &str = "39065120688df73291eb9ec890bd5fd72e2bc9f1";

    fn advertisement(head_line: &[u8]) -> Vec<u8> {
        let mut body = pkt::encode(SERVICE_ANNOUNCEMENT);
        body.extend(pkt::flush());
        body.extend(pkt::encode(head_line));
        body.extend(pkt::flush());
        body
    }

    #[test]
    fn test_parse_advertisement() {
        let head_line = format!(
            "{} HEAD\0multi_ack thin-pack no-progress symref=HEAD:refs/heads/master\n",
            TEST_HEAD_SHA
        );
        let body = advertisement(head_line.as_bytes());

        let head = parse_advertisement(&mut body.as_slice()).unwrap();
        assert_eq!(TEST_HEAD_SHA, head.to_string());
    }

    #[test]
    fn test_parse_advertisement_wrong_service() {
        let mut body = pkt::encode(b"# service=git-receive-pack\n");
        body.extend(pkt::flush());

        assert!(parse_advertisement(&mut body.as_slice()).is_err());
    }

    #[test]
    fn test_parse_advertisement_missing_flush() {
        let mut body = pkt::encode(SERVICE_ANNOUNCEMENT);
        body.extend(pkt::encode(format!("{} HEAD\0\n", TEST_HEAD_SHA).as_bytes()));

        assert!(parse_advertisement(&mut body.as_slice()).is_err());
    }

    #[test]
    fn test_parse_advertisement_short_head_line() {
        let body = advertisement(b"too short");
        assert!(parse_advertisement(&mut body.as_slice()).is_err());
    }

    #[test]
    fn test_negotiation_body_framing() {
        let want = Hash::from_str(TEST_HEAD_SHA).unwrap();
        let body = negotiation_body(&want);

        let expected = format!(
            "003ewant {} no-progress\n00000009done\n",
            TEST_HEAD_SHA
        );
        assert_eq!(expected.as_bytes(), body.as_slice());
    }

    #[test]
    fn test_strip_ack_nak() {
        let mut body = b"0008NAK\n".to_vec();
        body.extend(b"PACKrest-of-the-pack");

        let pack = strip_ack(&body).unwrap();
        assert_eq!(b"PACKrest-of-the-pack".to_vec(), pack);
    }

    #[test]
    fn test_strip_ack_ack() {
        let line = format!("ACK {}\n", TEST_HEAD_SHA);
        let mut body = pkt::encode(line.as_bytes());
        body.extend(b"PACK");

        let pack = strip_ack(&body).unwrap();
        assert_eq!(b"PACK".to_vec(), pack);
    }

    #[test]
    fn test_strip_ack_missing() {
        assert!(strip_ack(b"PACKno-ack-line").is_err());
        assert!(strip_ack(b"0008huh\nPACK").is_err());
    }
}
