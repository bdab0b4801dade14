//! Logging backend which writes to a file in the mod directory.
//!
//! The logger is registered as soon as the library is loaded, but the file can't be opened until
//! the framework tells us where the mod directory is. Messages logged before then wait in the
//! channel and are written once the writer thread starts.

use std::{
    fs::File,
    io::Write,
    path::Path,
    sync::{
        mpsc::{self, Receiver, Sender},
        Mutex,
    },
};

use chrono::Local;
use eyre::{eyre, Result, WrapErr};
use log::{Level, LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;

pub const LOG_FILE_NAME: &str = "opposite_dash.log";

#[derive(Clone, Copy)]
enum MessageType {
    Normal,
    Error,
    Warning,
    Debug,
}

struct Message {
    module: String,
    msg_type: MessageType,
    string: String,
    time: String,
}

impl Message {
    fn write_to(&self, out: &mut impl Write) {
        let level_name = match self.msg_type {
            MessageType::Normal => "info",
            MessageType::Error => "error",
            MessageType::Warning => "warning",
            MessageType::Debug => "debug",
        };

        //      [date time] [module] [level] Text
        let _ = writeln!(
            out,
            "[{}] [{}] [{}] {}",
            self.time, self.module, level_name, self.string
        );
    }
}

pub struct Logger;

impl Logger {
    pub fn commit(&self, record: &log::Record) {
        let msg_type = match record.level() {
            Level::Error => MessageType::Error,
            Level::Warn => MessageType::Warning,
            Level::Info => MessageType::Normal,
            Level::Debug | Level::Trace => MessageType::Debug,
        };

        let message = Message {
            module: record
                .module_path()
                .and_then(|path| path.split("::").last())
                .unwrap_or("unknown")
                .to_string(),
            msg_type,
            string: format!("{}", record.args()),
            time: Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        };

        if let Some(sender) = MSG_SENDER.get() {
            if let Ok(sender) = sender.lock() {
                // Fails only once the writer has gone, and then there's nowhere to report it.
                let _ = sender.send(message);
            }
        }
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            self.commit(record);
        }
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;
static MSG_SENDER: OnceCell<Mutex<Sender<Message>>> = OnceCell::new();
static MSG_RECEIVER: Mutex<Option<Receiver<Message>>> = Mutex::new(None);

fn install_panic_hook() {
    let previous = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "no message".to_string());

        let location = info
            .location()
            .map(|location| location.to_string())
            .unwrap_or_default();

        log::error!(
            "panic at {location}: {message}\n{:?}",
            backtrace::Backtrace::new()
        );

        previous(info);
    }));
}

/// Registers the logger. Messages are held until `start_writer` is called.
pub fn init() {
    install_panic_hook();

    let (sender, receiver) = mpsc::channel();

    if MSG_SENDER.set(Mutex::new(sender)).is_err() {
        return;
    }

    if let Ok(mut slot) = MSG_RECEIVER.lock() {
        *slot = Some(receiver);
    }

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}

/// Starts writing log messages to a file in `dir` on a background thread, so that normal game
/// code doesn't wait on the file.
pub fn start_writer(dir: &Path) -> Result<()> {
    let receiver = MSG_RECEIVER
        .lock()
        .map_err(|_| eyre!("log receiver lock poisoned"))?
        .take()
        .ok_or_else(|| eyre!("log writer already started"))?;

    let path = dir.join(LOG_FILE_NAME);
    let mut file =
        File::create(&path).wrap_err_with(|| format!("creating log file {}", path.display()))?;

    std::thread::spawn(move || {
        for msg in receiver {
            msg.write_to(&mut file);

            if cfg!(feature = "debug") {
                msg.write_to(&mut std::io::stderr());
            }
        }
    });

    Ok(())
}
