//! Line templates such as `"{timestamp} {level} [{logger}] {msg}"`, parsed once and
//! rendered for every record.

/// Closed set of known substitution tokens. Unknown `{names}` pass through as literal text,
/// which also keeps `{0}`-style message markers intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Timestamp,
    Level,
    Logger,
    Source,
    Msg,
    Thrown,
    Sequence,
    Thread,
}

impl Placeholder {
    /// Name as written between braces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::Logger => "logger",
            Self::Source => "source",
            Self::Msg => "msg",
            Self::Thrown => "thrown",
            Self::Sequence => "sequence",
            Self::Thread => "thread",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Timestamp,
        Self::Level,
        Self::Logger,
        Self::Source,
        Self::Msg,
        Self::Thrown,
        Self::Sequence,
        Self::Thread,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment {
    /// Text copied verbatim, including unknown `{names}`.
    Literal(String),
    /// Token substituted at render time.
    Placeholder(Placeholder),
}

/// Pre-parsed template: parse once, render many.
#[derive(Debug, Clone)]
pub struct FormatTemplate {
    segments: Vec<FormatSegment>,
}

impl FormatTemplate {
    /// Splits `template` into literal and placeholder segments.
    ///
    /// `\n` and `\t` escape sequences are expanded so templates can come from a
    /// single-line properties value.
    #[must_use]
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut i = 0;
        let chars: Vec<char> = template.chars().collect();

        while i < chars.len() {
            match chars[i] {
                '{' => {
                    if let Some(end) = chars[i..].iter().position(|&c| c == '}') {
                        let end = i + end;
                        let name: String = chars[i + 1..end].iter().collect();

                        if !current.is_empty() {
                            segments.push(FormatSegment::Literal(std::mem::take(&mut current)));
                        }

                        if let Some(ph) = Self::match_placeholder(&name) {
                            segments.push(FormatSegment::Placeholder(ph));
                        } else {
                            segments.push(FormatSegment::Literal(format!("{{{name}}}")));
                        }

                        i = end + 1;
                        continue;
                    }
                }
                '\\' if i + 1 < chars.len() => match chars[i + 1] {
                    'n' => {
                        current.push('\n');
                        i += 2;
                        continue;
                    }
                    't' => {
                        current.push('\t');
                        i += 2;
                        continue;
                    }
                    _ => {}
                },
                _ => {}
            }

            current.push(chars[i]);
            i += 1;
        }

        if !current.is_empty() {
            segments.push(FormatSegment::Literal(current));
        }

        Self { segments }
    }

    fn match_placeholder(name: &str) -> Option<Placeholder> {
        Placeholder::ALL.iter().copied().find(|ph| ph.as_str() == name)
    }

    #[must_use]
    pub fn segments(&self) -> &[FormatSegment] {
        &self.segments
    }

    /// Substitutes `values` into the pre-parsed segments.
    #[must_use]
    pub fn render(&self, values: &FormatValues) -> String {
        let mut result = String::new();

        for segment in &self.segments {
            match segment {
                FormatSegment::Literal(s) => result.push_str(s),
                FormatSegment::Placeholder(ph) => {
                    let value = match ph {
                        Placeholder::Timestamp => &values.timestamp,
                        Placeholder::Level => &values.level,
                        Placeholder::Logger => &values.logger,
                        Placeholder::Source => &values.source,
                        Placeholder::Msg => &values.msg,
                        Placeholder::Thrown => &values.thrown,
                        Placeholder::Sequence => &values.sequence,
                        Placeholder::Thread => &values.thread,
                    };
                    result.push_str(value);
                }
            }
        }

        result
    }
}

impl Default for FormatTemplate {
    fn default() -> Self {
        Self::parse(super::simple::DEFAULT_TEMPLATE)
    }
}

/// One field per placeholder, so a template can never reference a missing value.
#[derive(Debug, Clone, Default)]
pub struct FormatValues {
    pub timestamp: String,
    pub level: String,
    pub logger: String,
    pub source: String,
    pub msg: String,
    pub thrown: String,
    pub sequence: String,
    pub thread: String,
}

impl FormatValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = logger.into();
        self
    }

    /// `Class method`, or the logger name when the caller is unknown.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    #[must_use]
    pub fn msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    /// Rendered error, including its leading separator; empty when nothing was thrown.
    #[must_use]
    pub fn thrown(mut self, thrown: impl Into<String>) -> Self {
        self.thrown = thrown.into();
        self
    }

    #[must_use]
    pub fn sequence(mut self, sequence: i64) -> Self {
        self.sequence = sequence.to_string();
        self
    }

    #[must_use]
    pub fn thread(mut self, thread: i32) -> Self {
        self.thread = thread.to_string();
        self
    }
}
