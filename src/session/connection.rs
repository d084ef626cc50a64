// ABOUTME: Socket connection to the modem gateway with buffered writes and chunked reads
// ABOUTME: Reads are cancel safe so the session can interleave them with heartbeats and deadlines

use super::error::{SessionError, SessionResult};
use bytes::{Bytes, BytesMut};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

/// One TCP connection to the socket gateway in front of the modem
///
/// The gateway forwards bytes verbatim in both directions and has no framing
/// of its own, so a response is whatever arrives in one read.
#[derive(Debug)]
pub struct ModemConnection {
    // Writes go through a BufWriter and are flushed per command so the
    // gateway sees every command and heartbeat as one chunk.
    stream: BufWriter<TcpStream>,

    // Bytes read from the socket and not yet handed out.
    buffer: BytesMut,

    buffer_size: usize,
}

impl ModemConnection {
    /// Connect to `address`, giving up after `connect_timeout`
    pub async fn connect(
        address: &str,
        connect_timeout: Duration,
        buffer_size: usize,
    ) -> SessionResult<ModemConnection> {
        let socket = tokio::time::timeout(connect_timeout, TcpStream::connect(address))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        socket.set_nodelay(true)?;

        Ok(ModemConnection::new(socket, buffer_size))
    }

    pub fn new(socket: TcpStream, buffer_size: usize) -> ModemConnection {
        ModemConnection {
            stream: BufWriter::new(socket),
            buffer: BytesMut::with_capacity(buffer_size),
            buffer_size,
        }
    }

    /// Take every byte that is already waiting, without blocking.
    ///
    /// Used before writing a command so leftovers of earlier exchanges and
    /// unsolicited modem output are not mistaken for its response.
    pub fn drain(&mut self) -> SessionResult<Bytes> {
        loop {
            self.buffer.reserve(self.buffer_size);

            match self.stream.get_ref().try_read_buf(&mut self.buffer) {
                Ok(0) => return Err(SessionError::ConnectionClosed),
                Ok(_) => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(self.buffer.split().freeze())
    }

    /// Write `data` and flush it to the socket
    pub async fn write(&mut self, data: &[u8]) -> SessionResult<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Wait for the next chunk of data.
    ///
    /// Cancel safe: bytes received by a cancelled call are returned by the
    /// next one.
    pub async fn read_chunk(&mut self) -> SessionResult<Bytes> {
        if self.buffer.is_empty() {
            self.buffer.reserve(self.buffer_size);

            if 0 == self.stream.read_buf(&mut self.buffer).await? {
                return Err(SessionError::ConnectionClosed);
            }
        }

        Ok(self.buffer.split().freeze())
    }
}
