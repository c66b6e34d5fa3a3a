pub mod analysis;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_check;
pub mod ll1_parsing_table;
pub mod parse;
pub mod parse_tree;
pub mod predictive_parse;
pub mod pretty_print;

pub use analysis::Analysis;
pub use error::{GrammarError, ParseError, RejectReason, TableError};
pub use first_follow::{FirstSets, FollowSets};
pub use grammar::{Grammar, NonTerminal, Production, Symbol};
pub use ll1_check::{Conflict, Ll1Report};
pub use ll1_parsing_table::{Collision, ParsingTable};
pub use parse_tree::ParseTree;
pub use predictive_parse::{Action, Outcome, ParseResult, ParseStep};

pub const EPSILON: char = 'ε';
pub const END_MARK: char = '$';
