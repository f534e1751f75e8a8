//! Test helpers: an in-memory sink shared between the tracker and the test.

use std::{io, sync::Arc};

use parking_lot::Mutex;

/// A cloneable `Write` sink; every clone appends to the same buffer.
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }

    pub(crate) fn clear(&self) {
        self.0.lock().clear();
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Splits a rendered line into its bracket- and space-separated fields.
///
/// `"\r  3.0% [#...] [3/101 in 0s]"` becomes `["3.0%", "#...", "3/101", "in", "0s"]`.
pub(crate) fn fields(line: &str) -> Vec<&str> {
    line.split(['\r', ' ', '[', ']'])
        .filter(|s| !s.is_empty())
        .collect()
}
