//! Record builders layered over [`Logger::log`]. Every method checks
//! [`Logger::is_loggable`] before building anything.

use super::Logger;
use crate::level::Level;
use crate::record::{LogRecord, ResourceBundle, Thrown};
use std::sync::Arc;

impl Logger {
    /// Logs `msg` at `SEVERE`.
    pub fn severe(&self, msg: impl Into<String>) {
        self.log_msg(Level::SEVERE, msg);
    }

    /// Logs `msg` at `WARNING`.
    pub fn warning(&self, msg: impl Into<String>) {
        self.log_msg(Level::WARNING, msg);
    }

    /// Logs `msg` at `INFO`.
    pub fn info(&self, msg: impl Into<String>) {
        self.log_msg(Level::INFO, msg);
    }

    /// Logs `msg` at `CONFIG`.
    pub fn config(&self, msg: impl Into<String>) {
        self.log_msg(Level::CONFIG, msg);
    }

    /// Logs `msg` at `FINE`.
    pub fn fine(&self, msg: impl Into<String>) {
        self.log_msg(Level::FINE, msg);
    }

    /// Logs `msg` at `FINER`.
    pub fn finer(&self, msg: impl Into<String>) {
        self.log_msg(Level::FINER, msg);
    }

    /// Logs `msg` at `FINEST`.
    pub fn finest(&self, msg: impl Into<String>) {
        self.log_msg(Level::FINEST, msg);
    }

    /// Plain message at `level`; no record is built when the level is rejected.
    pub fn log_msg(&self, level: Level, msg: impl Into<String>) {
        if self.is_loggable(level) {
            self.log(LogRecord::new(level, msg));
        }
    }

    /// The message is built only if `level` passes.
    pub fn log_lazy(&self, level: Level, msg: impl FnOnce() -> String) {
        if self.is_loggable(level) {
            self.log(LogRecord::new(level, msg()));
        }
    }

    /// `msg` may reference the parameter as `{0}`.
    pub fn log_with_param(&self, level: Level, msg: impl Into<String>, param: impl ToString) {
        if self.is_loggable(level) {
            let mut record = LogRecord::new(level, msg);
            record.set_parameters(Some(vec![param.to_string()]));
            self.log(record);
        }
    }

    /// `{0}`, `{1}`, ... in `msg` are filled from `params` when formatted.
    pub fn log_with_params<I>(&self, level: Level, msg: impl Into<String>, params: I)
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        if self.is_loggable(level) {
            let mut record = LogRecord::new(level, msg);
            record.set_parameters(Some(collect_params(params)));
            self.log(record);
        }
    }

    /// Attaches the error that caused this record.
    pub fn log_with_thrown(&self, level: Level, msg: impl Into<String>, thrown: Thrown) {
        if self.is_loggable(level) {
            let mut record = LogRecord::new(level, msg);
            record.set_thrown(Some(thrown));
            self.log(record);
        }
    }

    /// Logs with an explicit source class and method instead of a resolved caller.
    pub fn logp(&self, level: Level, class: &str, method: &str, msg: impl Into<String>) {
        if self.is_loggable(level) {
            self.log(sourced(LogRecord::new(level, msg), class, method));
        }
    }

    /// Like [`Logger::logp`] with a single `{0}` parameter.
    pub fn logp_with_param(
        &self,
        level: Level,
        class: &str,
        method: &str,
        msg: impl Into<String>,
        param: impl ToString,
    ) {
        if self.is_loggable(level) {
            let mut record = sourced(LogRecord::new(level, msg), class, method);
            record.set_parameters(Some(vec![param.to_string()]));
            self.log(record);
        }
    }

    /// Like [`Logger::logp`] with positional parameters.
    pub fn logp_with_params<I>(
        &self,
        level: Level,
        class: &str,
        method: &str,
        msg: impl Into<String>,
        params: I,
    ) where
        I: IntoIterator,
        I::Item: ToString,
    {
        if self.is_loggable(level) {
            let mut record = sourced(LogRecord::new(level, msg), class, method);
            record.set_parameters(Some(collect_params(params)));
            self.log(record);
        }
    }

    /// Like [`Logger::logp`] with an attached error.
    pub fn logp_with_thrown(
        &self,
        level: Level,
        class: &str,
        method: &str,
        msg: impl Into<String>,
        thrown: Thrown,
    ) {
        if self.is_loggable(level) {
            let mut record = sourced(LogRecord::new(level, msg), class, method);
            record.set_thrown(Some(thrown));
            self.log(record);
        }
    }

    /// Like [`Logger::logp`] with `msg` treated as a key into `bundle`.
    pub fn logrb(
        &self,
        level: Level,
        class: &str,
        method: &str,
        bundle: Arc<ResourceBundle>,
        msg: impl Into<String>,
    ) {
        if self.is_loggable(level) {
            self.log(bundled(sourced(LogRecord::new(level, msg), class, method), bundle));
        }
    }

    /// Like [`Logger::logrb`] with positional parameters.
    pub fn logrb_with_params<I>(
        &self,
        level: Level,
        class: &str,
        method: &str,
        bundle: Arc<ResourceBundle>,
        msg: impl Into<String>,
        params: I,
    ) where
        I: IntoIterator,
        I::Item: ToString,
    {
        if self.is_loggable(level) {
            let mut record = bundled(sourced(LogRecord::new(level, msg), class, method), bundle);
            record.set_parameters(Some(collect_params(params)));
            self.log(record);
        }
    }

    /// Like [`Logger::logrb`] with an attached error.
    pub fn logrb_with_thrown(
        &self,
        level: Level,
        class: &str,
        method: &str,
        bundle: Arc<ResourceBundle>,
        msg: impl Into<String>,
        thrown: Thrown,
    ) {
        if self.is_loggable(level) {
            let mut record = bundled(sourced(LogRecord::new(level, msg), class, method), bundle);
            record.set_thrown(Some(thrown));
            self.log(record);
        }
    }

    /// `ENTRY` at `FINER`.
    pub fn entering(&self, class: &str, method: &str) {
        self.logp(Level::FINER, class, method, "ENTRY");
    }

    /// `ENTRY {0}` at `FINER`.
    pub fn entering_with_param(&self, class: &str, method: &str, param: impl ToString) {
        self.logp_with_param(Level::FINER, class, method, "ENTRY {0}", param);
    }

    /// `ENTRY {0} {1} ...` at `FINER`, one placeholder per parameter.
    pub fn entering_with_params<I>(&self, class: &str, method: &str, params: I)
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        if !self.is_loggable(Level::FINER) {
            return;
        }
        let params = collect_params(params);
        let mut msg = String::from("ENTRY");
        for i in 0..params.len() {
            msg.push_str(&format!(" {{{i}}}"));
        }
        self.logp_with_params(Level::FINER, class, method, msg, params);
    }

    /// `RETURN` at `FINER`.
    pub fn exiting(&self, class: &str, method: &str) {
        self.logp(Level::FINER, class, method, "RETURN");
    }

    /// `RETURN {0}` at `FINER`.
    pub fn exiting_with_result(&self, class: &str, method: &str, result: impl ToString) {
        self.logp_with_param(Level::FINER, class, method, "RETURN {0}", result);
    }

    /// `THROW` at `FINER`, carrying the error.
    pub fn throwing(&self, class: &str, method: &str, thrown: Thrown) {
        self.logp_with_thrown(Level::FINER, class, method, "THROW", thrown);
    }
}

fn collect_params<I>(params: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: ToString,
{
    params.into_iter().map(|p| p.to_string()).collect()
}

fn sourced(mut record: LogRecord, class: &str, method: &str) -> LogRecord {
    record.set_source_class_name(Some(class.to_string()));
    record.set_source_method_name(Some(method.to_string()));
    record
}

fn bundled(mut record: LogRecord, bundle: Arc<ResourceBundle>) -> LogRecord {
    record.set_resource_bundle_name(Some(bundle.name().to_string()));
    record.set_resource_bundle(Some(bundle));
    record
}
