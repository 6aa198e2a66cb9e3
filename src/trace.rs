// src/trace.rs
use crate::header::TraceHeader;

/// One seismic trace: a header plus its samples as `f64`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    header: TraceHeader,
    samples: Vec<f64>,
}

impl Trace {
    /// A trace of `samples` zeros with an empty header
    pub fn new(samples: usize) -> Self {
        Trace { header: TraceHeader::new(), samples: vec![0.0; samples] }
    }

    /// A trace of `samples` zeros with the given header
    pub fn with_header(samples: usize, header: TraceHeader) -> Self {
        Trace { header, samples: vec![0.0; samples] }
    }

    pub fn from_parts(header: TraceHeader, samples: Vec<f64>) -> Self {
        Trace { header, samples }
    }

    pub fn header(&self) -> &TraceHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut TraceHeader {
        &mut self.header
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut Vec<f64> {
        &mut self.samples
    }

    pub fn into_parts(self) -> (TraceHeader, Vec<f64>) {
        (self.header, self.samples)
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
