// src/reader/streaming.rs
use crate::error::Result;
use crate::header::TraceHeader;
use crate::trace::Trace;

/// A forward-only source of traces.
///
/// Implemented by [`SegyReader`](crate::SegyReader) and
/// [`SuReader`](crate::SuReader); lets code consume either format.
pub trait TraceStream {
    /// The next trace, or `None` past the last one
    fn next_trace(&mut self) -> Result<Option<Trace>>;

    /// The next trace header (samples skipped), or `None` past the last one
    fn next_header(&mut self) -> Result<Option<TraceHeader>>;
}

/// Iterator over the remaining traces of a reader.
///
/// Continues from the reader's current cursor and never rewinds. Stops
/// after the first error.
///
/// # Example
///
/// ```no_run
/// use seisio::SuReader;
///
/// let mut reader = SuReader::open("shots.su")?;
/// let mut energy = 0.0;
/// for trace in reader.traces() {
///     energy += trace?.samples().iter().map(|s| s * s).sum::<f64>();
/// }
/// # Ok::<(), seisio::SeisError>(())
/// ```
pub struct TraceIter<'a, S: TraceStream + ?Sized> {
    source: &'a mut S,
    done: bool,
}

impl<'a, S: TraceStream + ?Sized> TraceIter<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        TraceIter { source, done: false }
    }
}

impl<'a, S: TraceStream + ?Sized> Iterator for TraceIter<'a, S> {
    type Item = Result<Trace>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_trace() {
            Ok(Some(trace)) => Some(Ok(trace)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Iterator over the remaining trace headers of a reader
pub struct HeaderIter<'a, S: TraceStream + ?Sized> {
    source: &'a mut S,
    done: bool,
}

impl<'a, S: TraceStream + ?Sized> HeaderIter<'a, S> {
    pub fn new(source: &'a mut S) -> Self {
        HeaderIter { source, done: false }
    }
}

impl<'a, S: TraceStream + ?Sized> Iterator for HeaderIter<'a, S> {
    type Item = Result<TraceHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.source.next_header() {
            Ok(Some(header)) => Some(Ok(header)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeisError;

    struct Counter {
        left: usize,
        fail_at: Option<usize>,
    }

    impl TraceStream for Counter {
        fn next_trace(&mut self) -> Result<Option<Trace>> {
            if Some(self.left) == self.fail_at {
                return Err(SeisError::broken("bad trace"));
            }
            if self.left == 0 {
                return Ok(None);
            }
            self.left -= 1;
            Ok(Some(Trace::new(self.left)))
        }

        fn next_header(&mut self) -> Result<Option<TraceHeader>> {
            Ok(self.next_trace()?.map(|t| t.into_parts().0))
        }
    }

    #[test]
    fn test_iterates_until_end() {
        let mut source = Counter { left: 3, fail_at: None };
        let lengths: Vec<usize> = TraceIter::new(&mut source).map(|t| t.unwrap().len()).collect();
        assert_eq!(lengths, vec![2, 1, 0]);
        assert_eq!(HeaderIter::new(&mut source).count(), 0);
    }

    #[test]
    fn test_stops_after_error() {
        let mut source = Counter { left: 3, fail_at: Some(1) };
        let items: Vec<_> = TraceIter::new(&mut source).collect();
        assert_eq!(items.len(), 3);
        assert!(items[2].is_err());
    }
}
