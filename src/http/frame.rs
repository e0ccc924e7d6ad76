//! # Lectura de frames
//! src/http/frame.rs
//!
//! Acumula bytes de la conexión hasta ver el fin de los headers.
//!
//! Corta en el primero de estos casos:
//! 1. Aparece `\r\n\r\n` en el buffer
//! 2. El peer cierra (read de 0 bytes)
//! 3. Error de transporte (incluye timeout de lectura)
//! 4. El buffer supera [`MAX_REQUEST_BYTES`]
//!
//! No se leen más bytes por un `Content-Length` declarado: el body queda
//! completo solo si llegó en la misma ráfaga que los headers.

use super::request::find_header_end;
use std::io::{self, ErrorKind, Read};

/// Tope del buffer acumulado
pub const MAX_REQUEST_BYTES: usize = 100_000;

/// Tamaño de cada read
pub const READ_CHUNK_BYTES: usize = 4096;

/// Motivo por el que terminó la lectura
#[derive(Debug)]
pub enum FrameEnd {
    /// Se encontró el terminador de headers
    HeadersComplete,

    /// El peer cerró la conexión
    PeerClosed,

    /// Falló un read
    TransportError(io::Error),

    /// Se superó el tope de bytes
    SizeCapExceeded,
}

/// Bytes acumulados y el motivo del corte
#[derive(Debug)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub end: FrameEnd,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Lee un frame de request con el tope por defecto
pub fn read_frame<R: Read>(reader: &mut R) -> Frame {
    read_frame_capped(reader, MAX_REQUEST_BYTES)
}

/// Lee un frame de request cortando cuando el buffer supera `cap` bytes
pub fn read_frame_capped<R: Read>(reader: &mut R, cap: usize) -> Frame {
    let mut bytes = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        let read = match reader.read(&mut chunk) {
            Ok(0) => return Frame { bytes, end: FrameEnd::PeerClosed },
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Frame {
                    bytes,
                    end: FrameEnd::TransportError(e),
                }
            }
        };

        // El terminador puede quedar partido entre dos chunks
        let search_from = bytes.len().saturating_sub(3);
        bytes.extend_from_slice(&chunk[..read]);

        if find_header_end(&bytes[search_from..]).is_some() {
            return Frame {
                bytes,
                end: FrameEnd::HeadersComplete,
            };
        }

        if bytes.len() > cap {
            return Frame {
                bytes,
                end: FrameEnd::SizeCapExceeded,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Reader que entrega chunks predefinidos y después un resultado final
    struct ScriptedReader {
        chunks: VecDeque<io::Result<Vec<u8>>>,
        reads: usize,
    }

    impl ScriptedReader {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into(),
                reads: 0,
            }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            match self.chunks.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(data)) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        self.chunks.push_front(Ok(data[n..].to_vec()));
                    }
                    Ok(n)
                }
            }
        }
    }

    #[test]
    fn test_stops_at_terminator() {
        let mut reader = ScriptedReader::new(vec![
            Ok(b"GET / HTTP/1.1\r\nHost: x\r\n\r\nbody".to_vec()),
            Ok(b"never read".to_vec()),
        ]);

        let frame = read_frame(&mut reader);
        assert!(matches!(frame.end, FrameEnd::HeadersComplete));
        assert_eq!(frame.bytes, b"GET / HTTP/1.1\r\nHost: x\r\n\r\nbody");
        assert_eq!(reader.reads, 1);
    }

    #[test]
    fn test_terminator_split_across_chunks() {
        let mut reader = ScriptedReader::new(vec![
            Ok(b"GET / HTTP/1.1\r\n\r".to_vec()),
            Ok(b"\n".to_vec()),
            Ok(b"late".to_vec()),
        ]);

        let frame = read_frame(&mut reader);
        assert!(matches!(frame.end, FrameEnd::HeadersComplete));
        assert_eq!(frame.bytes, b"GET / HTTP/1.1\r\n\r\n");
    }

    #[test]
    fn test_peer_close_returns_partial() {
        let mut reader = ScriptedReader::new(vec![Ok(b"GET / HTT".to_vec())]);

        let frame = read_frame(&mut reader);
        assert!(matches!(frame.end, FrameEnd::PeerClosed));
        assert_eq!(frame.bytes, b"GET / HTT");
    }

    #[test]
    fn test_immediate_close_is_empty() {
        let mut reader = ScriptedReader::new(vec![]);
        let frame = read_frame(&mut reader);
        assert!(frame.is_empty());
        assert!(matches!(frame.end, FrameEnd::PeerClosed));
    }

    #[test]
    fn test_transport_error_returns_partial() {
        let mut reader = ScriptedReader::new(vec![
            Ok(b"GET /".to_vec()),
            Err(io::Error::new(ErrorKind::TimedOut, "read timed out")),
        ]);

        let frame = read_frame(&mut reader);
        assert_eq!(frame.bytes, b"GET /");
        match frame.end {
            FrameEnd::TransportError(e) => assert_eq!(e.kind(), ErrorKind::TimedOut),
            other => panic!("unexpected end: {:?}", other),
        }
    }

    #[test]
    fn test_interrupted_is_retried() {
        let mut reader = ScriptedReader::new(vec![
            Err(io::Error::from(ErrorKind::Interrupted)),
            Ok(b"GET / HTTP/1.0\r\n\r\n".to_vec()),
        ]);

        let frame = read_frame(&mut reader);
        assert!(matches!(frame.end, FrameEnd::HeadersComplete));
    }

    #[test]
    fn test_size_cap() {
        let mut chunks = Vec::new();
        for _ in 0..40 {
            chunks.push(Ok(vec![b'a'; READ_CHUNK_BYTES]));
        }
        let mut reader = ScriptedReader::new(chunks);

        let frame = read_frame(&mut reader);
        assert!(matches!(frame.end, FrameEnd::SizeCapExceeded));
        assert!(frame.bytes.len() > MAX_REQUEST_BYTES);
        assert!(frame.bytes.len() <= MAX_REQUEST_BYTES + READ_CHUNK_BYTES);
    }

    #[test]
    fn test_exactly_at_cap_keeps_reading() {
        let mut reader = ScriptedReader::new(vec![Ok(vec![b'a'; 10]), Ok(b"\r\n\r\n".to_vec())]);

        let frame = read_frame_capped(&mut reader, 10);
        assert!(matches!(frame.end, FrameEnd::HeadersComplete));
        assert_eq!(frame.bytes.len(), 14);
    }
}
