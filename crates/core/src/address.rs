//! Splitting references into registry key, index and sub-path.
//!
//! ```text
//! reference := IDENT ( '[' INTEGER ']' )? ( '.' sub-path )?
//! ```
//! Tabular cells are addressed as `name[row][column]`, where the column is an
//! integer position or a column name.

use crate::error::ResolveError;

/// A parsed reference. Nothing is cached; every lookup parses again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address<'r> {
    pub reference: &'r str,
    pub key: &'r str,
    /// `None` when there is no bracket group or its content is not an integer.
    pub index: Option<i64>,
    pub sub_path: Option<&'r str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSelector<'r> {
    Position(i64),
    Name(&'r str),
}

impl<'r> Address<'r> {
    pub fn parse(reference: &'r str) -> Self {
        let (head, sub_path) = match reference.find('.') {
            Some(dot) if dot > 0 => (&reference[..dot], Some(&reference[dot + 1..])),
            _ => (reference, None),
        };

        let mut key = head;
        let mut index = None;
        if let (Some(open), Some(close)) = (head.find('['), head.find(']')) {
            if open > 0 && close > open {
                key = &head[..open];
                index = parse_index(reference, &head[open + 1..close]);
            }
        }

        Address {
            reference,
            key,
            index,
            sub_path,
        }
    }

    /// Reads the row and column groups of a tabular reference. Both are taken
    /// from the raw reference text, independently of [`Address::index`].
    pub fn table_cell(&self) -> Result<(i64, ColumnSelector<'r>), ResolveError> {
        let reference = self.reference;
        let invalid_row = || ResolveError::InvalidRow(reference.to_string());

        let open = reference.find('[').ok_or_else(invalid_row)?;
        let close = reference.find(']').filter(|&c| c > open).ok_or_else(invalid_row)?;
        let row = reference[open + 1..close]
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid_row())?;

        let rest = &reference[close + 1..];
        let missing_column = || ResolveError::MissingColumnSelector(reference.to_string());
        let col_open = rest.find('[').ok_or_else(missing_column)?;
        let col_close = rest[col_open..]
            .find(']')
            .map(|c| col_open + c)
            .ok_or_else(missing_column)?;
        let column = &rest[col_open + 1..col_close];

        let selector = match column.trim().parse::<i64>() {
            Ok(position) => ColumnSelector::Position(position),
            Err(_) => ColumnSelector::Name(column),
        };
        Ok((row, selector))
    }
}

fn parse_index(reference: &str, text: &str) -> Option<i64> {
    match text.trim().parse::<i64>() {
        Ok(index) => Some(index),
        Err(_) => {
            log::debug!("Ignoring non-integer index '{}' in '{}'", text, reference);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let address = Address::parse("user");
        assert_eq!(address.key, "user");
        assert_eq!(address.index, None);
        assert_eq!(address.sub_path, None);
    }

    #[test]
    fn test_index_and_sub_path() {
        let address = Address::parse("items[2].$.name");
        assert_eq!(address.key, "items");
        assert_eq!(address.index, Some(2));
        assert_eq!(address.sub_path, Some("$.name"));
    }

    #[test]
    fn test_index_tolerates_whitespace_and_sign() {
        assert_eq!(Address::parse("a[ 4 ]").index, Some(4));
        assert_eq!(Address::parse("a[+1]").index, Some(1));
        assert_eq!(Address::parse("a[-1]").index, Some(-1));
    }

    #[test]
    fn test_malformed_index_is_dropped() {
        let address = Address::parse("a[x]");
        assert_eq!(address.key, "a");
        assert_eq!(address.index, None);
    }

    #[test]
    fn test_bracket_after_dot_belongs_to_sub_path() {
        let address = Address::parse("doc.items[0]");
        assert_eq!(address.key, "doc");
        assert_eq!(address.index, None);
        assert_eq!(address.sub_path, Some("items[0]"));
    }

    #[test]
    fn test_unclosed_bracket_stays_in_key() {
        assert_eq!(Address::parse("a[1").key, "a[1");
    }

    #[test]
    fn test_leading_metacharacters_are_part_of_the_name() {
        assert_eq!(Address::parse(".hidden").key, ".hidden");
        assert_eq!(Address::parse(".hidden").sub_path, None);
        assert_eq!(Address::parse("[0]").index, None);
    }

    #[test]
    fn test_table_cell_by_name_and_position() {
        assert_eq!(
            Address::parse("t[0][col1]").table_cell().unwrap(),
            (0, ColumnSelector::Name("col1"))
        );
        assert_eq!(
            Address::parse("t[1][ 0 ]").table_cell().unwrap(),
            (1, ColumnSelector::Position(0))
        );
    }

    #[test]
    fn test_table_cell_errors() {
        assert!(matches!(
            Address::parse("t").table_cell(),
            Err(ResolveError::InvalidRow(_))
        ));
        assert!(matches!(
            Address::parse("t[first][a]").table_cell(),
            Err(ResolveError::InvalidRow(_))
        ));
        assert!(matches!(
            Address::parse("t[0]").table_cell(),
            Err(ResolveError::MissingColumnSelector(_))
        ));
        assert!(matches!(
            Address::parse("t[0][a").table_cell(),
            Err(ResolveError::MissingColumnSelector(_))
        ));
    }
}
