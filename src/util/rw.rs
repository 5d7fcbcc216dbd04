use std::{cell::RefCell, fmt::Write, io, path::PathBuf, rc::Rc};

pub type RcRefCell<T> = Rc<RefCell<T>>;

pub struct StringBuffer {
    s: String,
}

impl StringBuffer {
    pub fn new() -> StringBuffer {
        StringBuffer { s: String::new() }
    }

    pub fn as_str(&self) -> &str {
        self.s.as_str()
    }
}

// String only implements fmt::Write
impl io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str_rep = std::str::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match self.s.write_str(str_rep) {
            Ok(_) => Ok(buf.len()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// For convenience, so we can pass around a shared stream writer.
//
// Progress and error chatter goes through these, so tests can capture
// exactly what the operator would see without touching real stdio.
pub struct WriteHandle {
    w: RcRefCell<dyn io::Write>,
}

impl WriteHandle {
    pub fn stdout_write_handle() -> WriteHandle {
        WriteHandle { w: Rc::new(RefCell::new(io::stdout())) }
    }

    pub fn stderr_write_handle() -> WriteHandle {
        WriteHandle { w: Rc::new(RefCell::new(io::stderr())) }
    }

    pub fn string_buff_write_handle() -> (WriteHandle, RcRefCell<StringBuffer>) {
        let buffer = Rc::new(RefCell::new(StringBuffer::new()));
        let h = WriteHandle { w: buffer.clone() };
        (h, buffer)
    }
}

impl Clone for WriteHandle {
    fn clone(&self) -> Self {
        WriteHandle { w: self.w.clone() }
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.w.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.borrow_mut().flush()
    }
}

#[macro_export]
macro_rules! write_errln {
    ($handle:expr, $($arg:tt)*) => {{
        use std::io::Write;
        let _ = writeln!($handle, $($arg)*);
    }};
}

// Generally, this will represent a file that has been opened,
// where we want to track the name along with it.
// Though it may be pre-read, in which case, we can just store
// the string.
pub enum DescribedReader {
    String((String, String)),
    FilePath(PathBuf),
}

impl DescribedReader {
    pub fn from_string(desc: String, data: String) -> DescribedReader {
        DescribedReader::String((desc, data))
    }

    pub fn from_file_path(path: PathBuf) -> DescribedReader {
        DescribedReader::FilePath(path)
    }

    pub fn desc(&self) -> &str {
        match self {
            DescribedReader::String((name, _)) => name,
            DescribedReader::FilePath(path) => {
                path.to_str().unwrap_or("<unknown path>")
            }
        }
    }

    pub fn reader<'a>(
        &'a self,
    ) -> Result<Box<dyn io::Read + 'a>, std::io::Error> {
        match self {
            DescribedReader::String((_, text)) => {
                Ok(Box::new(io::Cursor::new(text.as_bytes())))
            }
            DescribedReader::FilePath(path) => {
                Ok(Box::new(std::fs::File::open(path)?))
            }
        }
    }
}
