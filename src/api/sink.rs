//! Content sinks
//!
//! Destination boundary for binary document content. The download path
//! hands the response byte stream to a [`ContentSink`]; once `finish`
//! returns, the client's responsibility for the content ends. Sink
//! failures are fatal to the download and never retried.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait ContentSink: Send {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Signal that the full stream has been delivered.
    async fn finish(&mut self) -> io::Result<()>;
}

/// Persists document content to a file on disk.
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            file: File::create(path).await?,
        })
    }
}

#[async_trait]
impl ContentSink for FileSink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.file.flush().await
    }
}

/// Collects document content in memory.
#[derive(Debug, Default)]
pub struct BufferSink {
    bytes: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[async_trait]
impl ContentSink for BufferSink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }

    async fn finish(&mut self) -> io::Result<()> {
        Ok(())
    }
}
