use log::info;

/// Receives coarse progress notifications from an import.
pub trait ProgressListener {
    fn init(&mut self, total_work: usize, title: &str);

    fn step(&mut self, done: usize, message: &str);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn init(&mut self, _total_work: usize, _title: &str) {}

    fn step(&mut self, _done: usize, _message: &str) {}
}

/// Forwards notifications to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LogProgress {
    total: usize,
}

impl ProgressListener for LogProgress {
    fn init(&mut self, total_work: usize, title: &str) {
        self.total = total_work;
        info!("{title}");
    }

    fn step(&mut self, done: usize, message: &str) {
        info!("[{done}/{}] {message}", self.total);
    }
}
