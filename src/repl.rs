//! REPL (Read-Eval-Print Loop) for CQL constraints
//!
//! Each submitted line is parsed as CQL and translated with the session's
//! type-name scope and sort criteria. A trailing `\` keeps the input open
//! for another line.

use crate::ast::Filter;
use crate::config::TranslatorConfig;
use crate::error::FilterResult;
use crate::pretty::{pretty_print, render_query};
use crate::query::{SearchQuery, SortBy, SortOrder};
use crate::translate::{FilterTranslator, FilterVersion, TypeName};

/// REPL state: the translator plus per-session request settings
pub struct ReplState {
    pub translator: FilterTranslator,

    /// Record types every query is scoped to
    pub type_names: Vec<TypeName>,

    pub version: Option<FilterVersion>,

    pub sort: Vec<SortBy>,

    /// Echo the parsed filter before the translated query
    pub show_ast: bool,

    /// Multi-line input buffer
    pub input_buffer: String,
}

impl Default for ReplState {
    fn default() -> Self {
        Self::new(TranslatorConfig::default())
    }
}

impl ReplState {
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            translator: FilterTranslator::new(config),
            type_names: Vec::new(),
            version: None,
            sort: Vec::new(),
            show_ast: false,
            input_buffer: String::new(),
        }
    }

    /// Clear session settings, keeping the translator configuration
    pub fn reset(&mut self) {
        self.type_names.clear();
        self.version = None;
        self.sort.clear();
        self.show_ast = false;
        self.input_buffer.clear();
    }

    /// Process a line of input, joining `\`-continued lines
    pub fn process_line(&mut self, line: &str) -> InputResult {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            // An empty line ends a continuation
            return match self.force_submit() {
                Some(cql) => InputResult::Cql(cql),
                None => InputResult::Empty,
            };
        }

        // Meta-command (only at start, not in continuation)
        if trimmed.starts_with(':') && self.input_buffer.is_empty() {
            return InputResult::MetaCommand(MetaCommand::parse(trimmed));
        }

        if !self.input_buffer.is_empty() {
            self.input_buffer.push(' ');
        }
        match trimmed.strip_suffix('\\') {
            Some(head) => {
                self.input_buffer.push_str(head.trim_end());
                InputResult::Incomplete
            }
            None => {
                self.input_buffer.push_str(trimmed);
                InputResult::Cql(std::mem::take(&mut self.input_buffer))
            }
        }
    }

    /// Force submit current buffer (for Ctrl-D)
    pub fn force_submit(&mut self) -> Option<String> {
        let input = std::mem::take(&mut self.input_buffer);
        if input.trim().is_empty() {
            None
        } else {
            Some(input)
        }
    }

    /// Parse and translate one constraint
    ///
    /// CQL is version-independent, so the session version is not applied here.
    pub fn execute_cql(&self, cql: &str) -> FilterResult<ExecuteResult> {
        let filter = crate::parse_cql(cql)?;
        let query = self.translator.translate_filter(&filter, None)?;
        let query = SearchQuery {
            query: self.translator.scope_to_types(query, &self.type_names),
            sort: self.translator.sort_fields(&self.sort),
        };
        Ok(ExecuteResult { filter, query })
    }

    pub fn set_types(&mut self, names: &[String]) {
        self.type_names = names.iter().map(|n| TypeName::parse(n)).collect();
    }

    pub fn set_version(&mut self, version: &str) -> FilterResult<()> {
        self.version = Some(version.parse()?);
        Ok(())
    }

    pub fn set_sort(&mut self, args: &[String]) -> Result<(), String> {
        self.sort = parse_sort_spec(args)?;
        Ok(())
    }

    /// Render a result the way the REPL prints it
    pub fn format_result(&self, result: &ExecuteResult) -> String {
        let mut out = String::new();
        if self.show_ast {
            out.push_str("filter: ");
            out.push_str(&pretty_print(&result.filter));
            out.push('\n');
        }
        out.push_str(&render_query(&result.query.query));
        for field in &result.query.sort {
            let order = if field.descending { "desc" } else { "asc" };
            out.push_str(&format!("sort: {} {}\n", field.field, order));
        }
        out
    }
}

/// Parse `field [asc|desc] field [asc|desc] ...`
pub fn parse_sort_spec(args: &[String]) -> Result<Vec<SortBy>, String> {
    let mut sort: Vec<SortBy> = Vec::new();
    for arg in args {
        let order = match arg.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Ascending),
            "desc" => Some(SortOrder::Descending),
            _ => None,
        };
        match (order, sort.last_mut()) {
            (Some(order), Some(last)) => last.order = order,
            (Some(_), None) => return Err(format!("'{}' must follow a field name", arg)),
            (None, _) => sort.push(SortBy::asc(arg.as_str())),
        }
    }
    Ok(sort)
}

/// A translated line of input
#[derive(Debug)]
pub struct ExecuteResult {
    pub filter: Filter,
    pub query: SearchQuery,
}

/// Result of processing a line of input
#[derive(Debug)]
pub enum InputResult {
    MetaCommand(MetaCommand),
    Cql(String),
    Incomplete,
    Empty,
}

/// Meta-commands supported by the REPL
#[derive(Debug, PartialEq)]
pub enum MetaCommand {
    Help,
    Quit,
    /// `:types [names...]`, no names clears the scope
    Types(Vec<String>),
    /// `:version [v]`, no argument shows the current version
    Version(Option<String>),
    /// `:sort [field [asc|desc]]...`
    Sort(Vec<String>),
    /// Toggle the AST echo
    Ast,
    Reset,
    Unknown(String),
}

impl MetaCommand {
    pub fn parse(input: &str) -> Self {
        let input = input.trim_start_matches(':').trim();
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let args: Vec<String> = parts.map(String::from).collect();

        match cmd {
            "help" | "h" | "?" => MetaCommand::Help,
            "quit" | "q" | "exit" => MetaCommand::Quit,
            "types" | "type" | "t" => MetaCommand::Types(args),
            "version" | "v" => {
                if args.len() > 1 {
                    MetaCommand::Unknown(":version takes at most one argument".to_string())
                } else {
                    MetaCommand::Version(args.into_iter().next())
                }
            }
            "sort" | "s" => MetaCommand::Sort(args),
            "ast" => MetaCommand::Ast,
            "reset" => MetaCommand::Reset,
            other => MetaCommand::Unknown(format!("Unknown command: :{}", other)),
        }
    }
}
