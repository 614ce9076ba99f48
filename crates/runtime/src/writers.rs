//! The two process-wide writers (spec.md §6): "out" and "err". Every
//! `print`/`println` builtin and every diagnostic routes through these
//! rather than touching `std::io::stdout()`/`stderr()` directly, so a
//! host embedding the interpreter (or a test) can capture output.

use std::io::Write;
use std::sync::{Arc, Mutex};

pub type Writer = Arc<Mutex<dyn Write + Send>>;

#[derive(Clone)]
pub struct Writers {
    pub out: Writer,
    pub err: Writer,
}

impl Writers {
    /// The driver's default: real stdout/stderr.
    pub fn stdio() -> Self {
        Writers {
            out: Arc::new(Mutex::new(std::io::stdout())),
            err: Arc::new(Mutex::new(std::io::stderr())),
        }
    }

    /// In-memory writers for tests that need to assert on printed output.
    pub fn buffered() -> (Self, Arc<Mutex<Vec<u8>>>, Arc<Mutex<Vec<u8>>>) {
        let out_buf = Arc::new(Mutex::new(Vec::new()));
        let err_buf = Arc::new(Mutex::new(Vec::new()));
        (
            Writers { out: BufferWriter::wrap(out_buf.clone()), err: BufferWriter::wrap(err_buf.clone()) },
            out_buf,
            err_buf,
        )
    }

    pub fn write_out(&self, s: &str) {
        let _ = self.out.lock().unwrap().write_all(s.as_bytes());
    }

    pub fn write_err(&self, s: &str) {
        let _ = self.err.lock().unwrap().write_all(s.as_bytes());
    }
}

/// Adapter so a `Arc<Mutex<Vec<u8>>>` can back a `Writer`.
struct BufferWriter {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    fn wrap(buf: Arc<Mutex<Vec<u8>>>) -> Writer {
        Arc::new(Mutex::new(BufferWriter { buf }))
    }
}

impl Write for BufferWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.lock().unwrap().write(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
