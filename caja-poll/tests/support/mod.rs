mod mock_source;

pub use mock_source::MockSource;
