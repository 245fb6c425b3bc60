//! Kitty terminal graphics protocol framing.
//!
//! Commands are `ESC _G <key>=<value>,… ; <base64 payload> ESC \`. Transmissions larger than
//! [`MAX_CHUNK`] base64 bytes are split across several commands, every one but the last carrying
//! `m=1`.
use std::io;
use std::io::Write;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Maximum base64 payload per command.
pub const MAX_CHUNK: usize = 4096;

const PREFIX: &[u8] = b"\x1b_G";
const TERMINATOR: &[u8] = b"\x1b\\";

/// One decoded graphics command.
///
/// Single-character fields hold the raw key byte (`a=T` gives `action: Some(b'T')`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Command {
    pub action: Option<u8>,
    pub quiet: Option<u8>,
    pub format: Option<u32>,
    pub medium: Option<u8>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size: Option<u32>,
    pub offset: Option<u32>,
    pub id: Option<u32>,
    pub number: Option<u32>,
    pub placement: Option<u32>,
    pub compression: Option<u8>,
    pub more: bool,
    pub payload: Vec<u8>,
}

/// Writes `png` as a transmit-and-display sequence and returns the number of bytes written.
pub fn encode<W: Write>(out: &mut W, png: &[u8]) -> io::Result<usize> {
    let data = STANDARD.encode(png);
    let mut written = 0;
    let mut chunks = data.as_bytes().chunks(MAX_CHUNK).peekable();
    let mut first = true;
    while let Some(chunk) = chunks.next() {
        let more = u8::from(chunks.peek().is_some());
        let header = if first {
            format!("\x1b_Gf=100,a=T,m={more};")
        } else {
            format!("\x1b_Gm={more};")
        };
        first = false;
        out.write_all(header.as_bytes())?;
        out.write_all(chunk)?;
        out.write_all(TERMINATOR)?;
        written += header.len() + chunk.len() + TERMINATOR.len();
    }
    Ok(written)
}

pub fn encode_to_string(png: &[u8]) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = encode(&mut out, png);
    String::from_utf8(out).unwrap_or_default()
}

/// Decodes the command at the start of `buf`.
///
/// Returns the command and the number of bytes it occupied, or `None` when `buf` does not start
/// with a well-formed, terminated command.
pub fn decode_command(buf: &[u8]) -> Option<(Command, usize)> {
    let body = buf.strip_prefix(PREFIX)?;
    let end = body.windows(2).position(|w| w == TERMINATOR)?;
    let body = &body[..end];

    let (control, payload) = match body.iter().position(|&b| b == b';') {
        Some(i) => (&body[..i], &body[i + 1..]),
        None => (body, &body[body.len()..]),
    };

    let mut command = Command::default();
    for pair in control.split(|&b| b == b',').filter(|p| !p.is_empty()) {
        let [key, b'=', value @ ..] = pair else {
            return None;
        };
        if value.is_empty() {
            return None;
        }
        match *key {
            b'a' => command.action = Some(single(value)?),
            b'q' => command.quiet = Some(single(value)?),
            b'f' => command.format = Some(integer(value)?),
            b't' => command.medium = Some(single(value)?),
            b's' => command.width = Some(integer(value)?),
            b'v' => command.height = Some(integer(value)?),
            b'S' => command.size = Some(integer(value)?),
            b'O' => command.offset = Some(integer(value)?),
            b'i' => command.id = Some(integer(value)?),
            b'I' => command.number = Some(integer(value)?),
            b'p' => command.placement = Some(integer(value)?),
            b'o' => command.compression = Some(single(value)?),
            b'm' => command.more = value[0] != b'0',
            _ => {}
        }
    }

    command.payload = STANDARD.decode(payload).ok()?;
    Some((command, PREFIX.len() + end + TERMINATOR.len()))
}

/// Decodes a chunked transmission: commands are read until one without `m=1` or until decoding
/// fails. Returns the commands and the total bytes consumed.
pub fn decode_commands(mut buf: &[u8]) -> (Vec<Command>, usize) {
    let mut commands = Vec::new();
    let mut consumed = 0;
    while let Some((command, n)) = decode_command(buf) {
        buf = &buf[n..];
        consumed += n;
        let more = command.more;
        commands.push(command);
        if !more {
            break;
        }
    }
    (commands, consumed)
}

fn single(value: &[u8]) -> Option<u8> {
    match value {
        [c] => Some(*c),
        _ => None,
    }
}

fn integer(value: &[u8]) -> Option<u32> {
    if !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(value).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn small_payload_is_a_single_command() {
        let mut out = Vec::new();
        let n = encode(&mut out, b"png").unwrap();
        assert_eq!(out, b"\x1b_Gf=100,a=T,m=0;cG5n\x1b\\".to_vec());
        assert_eq!(n, out.len());
    }

    #[test]
    fn large_payload_is_chunked_and_reassembles() {
        let png: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let encoded = encode_to_string(&png);

        let (commands, consumed) = decode_commands(encoded.as_bytes());
        assert_eq!(consumed, encoded.len());
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[0].action, Some(b'T'));
        assert_eq!(commands[0].format, Some(100));
        assert!(commands[..3].iter().all(|c| c.more));
        assert!(!commands[3].more);
        assert_eq!(commands[1].action, None);

        let joined: Vec<u8> = commands.into_iter().flat_map(|c| c.payload).collect();
        assert_eq!(joined, png);
    }

    #[test]
    fn decodes_every_known_key() {
        let input = b"\x1b_Ga=t,q=2,f=32,t=f,s=10,v=20,S=30,O=40,i=7,I=8,p=9,o=z,m=1;\x1b\\rest";
        let (command, n) = decode_command(input).unwrap();
        assert_eq!(n, input.len() - 4);
        assert_eq!(
            command,
            Command {
                action: Some(b't'),
                quiet: Some(b'2'),
                format: Some(32),
                medium: Some(b'f'),
                width: Some(10),
                height: Some(20),
                size: Some(30),
                offset: Some(40),
                id: Some(7),
                number: Some(8),
                placement: Some(9),
                compression: Some(b'z'),
                more: true,
                payload: Vec::new(),
            }
        );
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let (command, _) = decode_command(b"\x1b_GX=5,i=3;\x1b\\").unwrap();
        assert_eq!(command.id, Some(3));
    }

    #[test]
    fn malformed_input_consumes_nothing() {
        assert_eq!(decode_command(b"plain text"), None);
        assert_eq!(decode_command(b"\x1b_Gi=3;AAAA"), None);
        assert_eq!(decode_command(b"\x1b_Gi=x;\x1b\\"), None);
        assert_eq!(decode_command(b"\x1b_Gi;\x1b\\"), None);
        assert_eq!(decode_command(b"\x1b_Gm=0;!!!!\x1b\\"), None);
        assert_eq!(decode_commands(b"garbage"), (Vec::new(), 0));
    }

    #[test]
    fn decode_stops_after_last_chunk() {
        let mut buf = encode_to_string(b"one").into_bytes();
        let first_len = buf.len();
        buf.extend_from_slice(&encode_to_string(b"two").into_bytes());
        let (commands, consumed) = decode_commands(&buf);
        assert_eq!(commands.len(), 1);
        assert_eq!(consumed, first_len);
        assert_eq!(commands[0].payload, b"one".to_vec());
    }
}
