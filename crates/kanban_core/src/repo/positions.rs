//! Dense sibling ordering for columns and cards.
//!
//! # Invariants
//! - Siblings are listed by `position ASC, id ASC`, so ties left by older
//!   data still resolve deterministically.
//! - After `resequence`, siblings hold positions `0..n` in list order.
//! - Callers run these helpers inside an immediate write transaction; the
//!   read-then-write sequence is not safe on its own.

use super::hierarchy_repo::{RepoError, RepoResult};
use crate::model::board::{BoardId, ColumnId};
use rusqlite::{params, Connection};

/// Parent scope of one ordered sibling list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Siblings {
    /// Columns of one board.
    Columns(BoardId),
    /// Cards of one column.
    Cards(ColumnId),
}

impl Siblings {
    fn parent_id(self) -> i64 {
        match self {
            Self::Columns(board_id) => board_id,
            Self::Cards(column_id) => column_id,
        }
    }

    /// Counts siblings; with dense positions this is the append position.
    pub(super) fn count(self, conn: &Connection) -> RepoResult<u32> {
        let sql = match self {
            Self::Columns(_) => "SELECT COUNT(*) FROM columns WHERE board_id = ?1;",
            Self::Cards(_) => "SELECT COUNT(*) FROM cards WHERE column_id = ?1;",
        };
        let count: i64 = conn.query_row(sql, [self.parent_id()], |row| row.get(0))?;
        u32::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("sibling count `{count}` out of range")))
    }

    /// Lists sibling ids in display order.
    pub(super) fn ids(self, conn: &Connection) -> RepoResult<Vec<i64>> {
        let sql = match self {
            Self::Columns(_) => {
                "SELECT id FROM columns WHERE board_id = ?1 ORDER BY position ASC, id ASC;"
            }
            Self::Cards(_) => {
                "SELECT id FROM cards WHERE column_id = ?1 ORDER BY position ASC, id ASC;"
            }
        };
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([self.parent_id()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }

    /// Rewrites positions to match `ordered_ids`.
    ///
    /// Only rows whose position changes are touched, and those get
    /// `updated_at = now_ms`.
    pub(super) fn resequence(
        self,
        conn: &Connection,
        ordered_ids: &[i64],
        now_ms: i64,
    ) -> RepoResult<()> {
        let sql = match self {
            Self::Columns(_) => {
                "UPDATE columns
                 SET position = ?2,
                     updated_at = ?3
                 WHERE id = ?1
                   AND position != ?2;"
            }
            Self::Cards(_) => {
                "UPDATE cards
                 SET position = ?2,
                     updated_at = ?3
                 WHERE id = ?1
                   AND position != ?2;"
            }
        };
        let mut stmt = conn.prepare(sql)?;
        for (index, id) in ordered_ids.iter().enumerate() {
            stmt.execute(params![id, position_value(index)?, now_ms])?;
        }
        Ok(())
    }

    /// Places `member_id` at `target` among its siblings and resequences.
    ///
    /// `None` moves the member to the end. Targets past the end are clamped.
    pub(super) fn place(
        self,
        conn: &Connection,
        member_id: i64,
        target: Option<u32>,
        now_ms: i64,
    ) -> RepoResult<()> {
        let mut ids = self.ids(conn)?;
        ids.retain(|id| *id != member_id);
        let index = insertion_index(target, ids.len());
        ids.insert(index, member_id);
        self.resequence(conn, &ids, now_ms)
    }

    /// Closes gaps after a member left this sibling list.
    pub(super) fn compact(self, conn: &Connection, now_ms: i64) -> RepoResult<()> {
        let ids = self.ids(conn)?;
        self.resequence(conn, &ids, now_ms)
    }
}

fn insertion_index(target: Option<u32>, len: usize) -> usize {
    target.map_or(len, |value| {
        usize::try_from(value).map_or(len, |index| index.min(len))
    })
}

fn position_value(index: usize) -> RepoResult<i64> {
    i64::try_from(index)
        .map_err(|_| RepoError::InvalidData(format!("position index `{index}` out of range")))
}

#[cfg(test)]
mod tests {
    use super::insertion_index;

    #[test]
    fn insertion_index_appends_by_default() {
        assert_eq!(insertion_index(None, 3), 3);
    }

    #[test]
    fn insertion_index_clamps_past_end() {
        assert_eq!(insertion_index(Some(0), 3), 0);
        assert_eq!(insertion_index(Some(2), 3), 2);
        assert_eq!(insertion_index(Some(42), 3), 3);
        assert_eq!(insertion_index(Some(5), 0), 0);
    }
}
