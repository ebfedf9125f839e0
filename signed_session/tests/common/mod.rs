pub mod mock_browser;

pub use mock_browser::MockBrowser;
