//! Destinations for verbose solver reports.

use std::io::{Error, ErrorKind, Result, Stdout, Write, stdout};

/// Where diagnostic output of an adapter goes.
pub enum PrintTarget {
    Stdout(Stdout),
    Buffer(Vec<u8>),
    /// Any `Write` stream, e.g. a file or a pipe.
    Stream(Box<dyn Write + Send + Sync>),
    Sink,
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrintTarget::Stdout(_) => write!(f, "PrintTarget::Stdout"),
            PrintTarget::Buffer(b) => write!(f, "PrintTarget::Buffer({} bytes)", b.len()),
            PrintTarget::Stream(_) => write!(f, "PrintTarget::Stream"),
            PrintTarget::Sink => write!(f, "PrintTarget::Sink"),
        }
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout(out) => out.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout(out) => out.flush(),
            PrintTarget::Stream(stream) => stream.flush(),
            PrintTarget::Buffer(_) | PrintTarget::Sink => Ok(()),
        }
    }
}

/// Implemented by adapters whose verbose reports can be redirected.
pub trait ConfigurablePrintTarget {
    fn print_to_stdout(&mut self);
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    fn print_to_buffer(&mut self);
    /// Discard all output.
    fn print_to_sink(&mut self);
    /// Contents of the internal buffer; an error unless buffering is on.
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(stdout());
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn print_to_sink(&mut self) {
        *self = PrintTarget::Sink;
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).into_owned()),
            _ => Err(Error::new(ErrorKind::Other, "print buffering is not configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_collects_output() {
        let mut t = PrintTarget::default();
        assert!(t.get_print_buffer().is_err());
        t.print_to_buffer();
        writeln!(t, "front size {}", 4).unwrap();
        assert_eq!(t.get_print_buffer().unwrap(), "front size 4\n");
        t.print_to_sink();
        writeln!(t, "dropped").unwrap();
        assert!(t.get_print_buffer().is_err());
    }
}
