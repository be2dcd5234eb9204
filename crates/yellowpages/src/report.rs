use std::fmt::Display;
use std::sync::Mutex;

/// Progress and failure notices emitted while paginating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeEvent {
    PageRequested {
        page: u32,
        url: String,
    },
    PageScraped {
        page: u32,
        listings: usize,
    },
    NoMoreListings {
        page: u32,
    },
    /// Pagination stops after this one.
    PageFailed {
        page: u32,
        status: Option<u16>,
        reason: String,
    },
    AddressUnparsed {
        page: u32,
        detail: String,
    },
}

impl Display for ScrapeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeEvent::PageRequested { page, url } => {
                write!(f, "Retrieving page {}: {}", page, url)
            }
            ScrapeEvent::PageScraped { page, listings } => {
                write!(f, "Page {}: {} listing(s)", page, listings)
            }
            ScrapeEvent::NoMoreListings { page } => {
                write!(f, "No more listings found on page {}, stopping", page)
            }
            ScrapeEvent::PageFailed {
                page,
                status: Some(status),
                ..
            } => write!(f, "Page {} retrieval failed with status {}", page, status),
            ScrapeEvent::PageFailed { page, reason, .. } => {
                write!(f, "Error retrieving page {}: {}", page, reason)
            }
            ScrapeEvent::AddressUnparsed { page, detail } => {
                write!(f, "Page {}: {}", page, detail)
            }
        }
    }
}

pub trait Reporter {
    fn report(&self, event: ScrapeEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: ScrapeEvent) {
        match event {
            ScrapeEvent::PageRequested { .. }
            | ScrapeEvent::PageScraped { .. }
            | ScrapeEvent::NoMoreListings { .. } => log::info!("{}", event),
            ScrapeEvent::AddressUnparsed { .. } => log::warn!("{}", event),
            ScrapeEvent::PageFailed { .. } => log::error!("{}", event),
        }
    }
}

/// Keeps every event in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    events: Mutex<Vec<ScrapeEvent>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScrapeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, event: ScrapeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
