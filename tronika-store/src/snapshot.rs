use serde::{Deserialize, Serialize};
use tronika_core::{Course, Task, TaskBoard, default_courses};

pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk shape of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub courses: Vec<Course>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Default for BoardSnapshot {
    /// A first-run board: no tasks, the stock course list.
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tasks: Vec::new(),
            courses: default_courses(),
        }
    }
}

impl BoardSnapshot {
    pub fn into_board(self) -> TaskBoard {
        TaskBoard::from_parts(self.tasks, self.courses)
    }

    pub fn from_board(board: &TaskBoard) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            tasks: board.tasks().to_vec(),
            courses: board.courses().to_vec(),
        }
    }
}
