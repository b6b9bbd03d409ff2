// Processing module for dataset analysis and cleaning
// Author: Gabriel Demetrios Lafis

mod aggregate;
mod filter;
mod stats;
mod transform;
mod view;

pub use aggregate::*;
pub use filter::*;
pub use stats::*;
pub use transform::*;
pub use view::*;

use thiserror::Error;

use crate::data::{DataError, Dataset};

/// Represents a data processor that derives a new dataset snapshot
pub trait DataProcessor {
    /// Process a dataset and return a new dataset
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError>;

    /// Get the processor name
    fn name(&self) -> &str;

    /// Get the processor type
    fn processor_type(&self) -> ProcessorType;
}

/// Represents a processor type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessorType {
    Transform,
    Filter,
    Sort,
    Aggregate,
    Stats,
    Custom(String),
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Pipeline for chaining multiple processors
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn DataProcessor>>,
}

impl Pipeline {
    /// Create a new pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: Vec::new(),
        }
    }

    /// Add a processor to the pipeline
    pub fn add<P: DataProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Number of processors in the pipeline
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Check if the pipeline has no processors
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Execute the pipeline on a dataset
    ///
    /// Each step sees the complete output of the previous one; the first
    /// error aborts the run and no partial result is returned.
    pub fn execute(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        let mut current = input.clone();

        for processor in &self.processors {
            log::debug!("pipeline '{}': running {}", self.name, processor.name());
            current = processor.process(&current)?;
        }

        Ok(current)
    }
}

impl DataProcessor for Pipeline {
    fn process(&self, input: &Dataset) -> Result<Dataset, ProcessingError> {
        self.execute(input)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Custom("Pipeline".to_string())
    }
}
