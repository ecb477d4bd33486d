//! Download a file over HTTP

use anyhow::{Context, Result};
use changestore::{Store, write_preserving_mode};
use std::fs;
use std::io;
use std::path::PathBuf;
use tasktree::{Module, Probe};

/// Largest body accepted from the server (100 MiB)
const MAX_DOWNLOAD_SIZE: u64 = 100 * 1024 * 1024;

/// Download with snapshot-based reversal
///
/// The status check downloads the file again and compares it with the
/// destination, so it needs network access.
#[derive(Debug, Clone)]
pub struct HttpGet {
    pub url: String,
    pub dest: PathBuf,
    pub store: Store,
}

impl HttpGet {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>, store: &Store) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            store: store.clone(),
        }
    }

    fn dest(&self) -> PathBuf {
        crate::paths::expand_path(&self.dest)
    }

    fn fetch(&self) -> Result<Vec<u8>> {
        let agent = ureq::Agent::new_with_defaults();
        let mut response = agent
            .get(self.url.as_str())
            .header("User-Agent", "genesis")
            .call()
            .with_context(|| format!("Could not fetch {}", self.url))?;

        response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_SIZE)
            .read_to_vec()
            .context("Failed to read response body")
    }
}

impl Module for HttpGet {
    fn id(&self) -> String {
        self.describe()
    }

    fn describe(&self) -> String {
        format!("HttpGet: {} => {}", self.url, self.dest.display())
    }

    fn status(&self) -> Result<Probe> {
        let dest = match fs::read(self.dest()) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(Probe::fail("Destination file does not exist."));
            }
            Err(e) => return Err(e).context("Could not read destination file."),
        };
        if self.fetch()? == dest {
            Ok(Probe::pass("File has been downloaded."))
        } else {
            Ok(Probe::fail("File has not been downloaded."))
        }
    }

    fn install(&self) -> Result<String> {
        let body = self.fetch()?;
        let dest = self.dest();
        self.store
            .save_file(&dest, "")
            .context("Could not save snapshot to the store.")?;
        write_preserving_mode(&dest, &body)
            .with_context(|| format!("Could not write destination file {}", dest.display()))?;
        Ok(format!("Downloaded {} bytes.", body.len()))
    }

    fn remove(&self) -> Result<String> {
        self.store
            .restore_file(self.dest(), "")
            .context("Failed to restore destination file.")?;
        Ok("Successfully restored destination file.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;
    use tempfile::TempDir;

    /// Serve `body` to every request on a local port
    fn serve(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).is_ok_and(|n| n > 0) {
                    if line == "\r\n" {
                        break;
                    }
                    line.clear();
                }
                let _ = write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
            }
        });
        format!("http://{addr}/file")
    }

    #[test]
    fn test_download_and_restore() {
        let url = serve("remote content\n");
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("file");
        fs::write(&dest, "local\n").unwrap();
        let store = Store::open(dir.path().join("state")).unwrap();

        let module = HttpGet::new(url, &dest, &store);
        assert!(!module.status().unwrap().status.is_pass());

        module.install().unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "remote content\n");
        assert!(module.status().unwrap().status.is_pass());

        module.remove().unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "local\n");
    }

    #[test]
    fn test_missing_destination_fails_without_network() {
        let dir = TempDir::new().unwrap();
        let module = HttpGet::new("http://127.0.0.1:9/none", dir.path().join("x"), &Store::disabled());
        assert!(!module.status().unwrap().status.is_pass());
    }
}
