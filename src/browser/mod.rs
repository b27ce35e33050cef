pub mod manager;
pub mod renderer;
pub mod session;
pub mod stealth;


pub use manager::{BrowserSessionId, ChromiumLauncher, ChromiumSession};
pub use renderer::{PageRenderer, PageSource};
pub use session::{BrowserLauncher, BrowserSession};
pub use stealth::UserAgentGenerator;
