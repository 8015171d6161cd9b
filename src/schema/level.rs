use crate::error::{constants, LevelError, Result};
use crate::schema::dto::{CellDto, GateWaveDto, GoalDto, LevelConfigDto};
use crate::schema::types::{ColorId, ElementType, GateDirection, GoalType};

/// A fully reconstructed level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    pub level: u32,
    pub total_slot: i32,
    pub goals: Vec<Goal>,
    pub containers: Vec<ColorId>,
    pub grid: Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Goal {
    pub goal_type: GoalType,
    pub target_count: i32,
    pub target_color: ColorId,
}

/// Contents of one grid position.
///
/// The default cell is present (`is_empty == false`) and carries nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub is_empty: bool,
    pub element_type: ElementType,
    pub gate_direction: GateDirection,
    pub ice_hit_points: i32,
    pub screw_hit_points: i32,
    pub lock_item_count: i32,
    pub lock_item_color: ColorId,
    pub colors: Vec<ColorId>,
    pub gate_waves: Vec<GateWave>,
}

/// Colors released together from a gated cell
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GateWave {
    pub colors: Vec<ColorId>,
}

/// Column-major cell storage: `index = column * rows + row`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// A grid with every position holding a default cell
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![Cell::default(); columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, column: usize, row: usize) -> Option<usize> {
        (column < self.columns && row < self.rows).then(|| column * self.rows + row)
    }

    pub fn get(&self, column: usize, row: usize) -> Option<&Cell> {
        self.index(column, row).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, column: usize, row: usize) -> Option<&mut Cell> {
        self.index(column, row).map(move |i| &mut self.cells[i])
    }

    /// Cells of one column, row 0 first
    pub fn column(&self, column: usize) -> Option<&[Cell]> {
        (column < self.columns).then(|| &self.cells[column * self.rows..(column + 1) * self.rows])
    }

    /// All cells with their `(column, row)` position, column by column
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &Cell)> + '_ {
        let rows = self.rows.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i / rows, i % rows), cell))
    }
}

impl Level {
    /// Build a level from its wire record.
    ///
    /// The declared `rows`/`columns` decide the grid size. Source cells outside
    /// that range are ignored; positions the source does not cover, or covers
    /// with `null`, hold a default cell.
    pub fn from_dto(dto: &LevelConfigDto) -> Result<Self> {
        Self::from_dto_bounded(dto, None)
    }

    /// [`Level::from_dto`] with an optional cap on the declared row and column
    /// counts. Records declaring more are rejected instead of allocated.
    pub fn from_dto_bounded(dto: &LevelConfigDto, max_dimension: Option<usize>) -> Result<Self> {
        if dto.level < 1 {
            return Err(LevelError::InvalidLevel(format!(
                "{} (got {})",
                constants::ERR_LEVEL_NUMBER,
                dto.level
            )));
        }
        let columns = grid_dimension(dto.level, "columns", dto.columns, max_dimension)?;
        let rows = grid_dimension(dto.level, "rows", dto.rows, max_dimension)?;

        let mut grid = Grid::new(columns, rows);
        for (column, source_column) in dto.grid.iter().take(columns).enumerate() {
            for (row, source_cell) in source_column.iter().take(rows).enumerate() {
                if let (Some(source), Some(cell)) = (source_cell, grid.get_mut(column, row)) {
                    *cell = Cell::from(source);
                }
            }
        }

        Ok(Self {
            level: dto.level as u32,
            total_slot: dto.total_slot,
            goals: dto.goals.iter().map(Goal::from).collect(),
            containers: dto.containers.clone(),
            grid,
        })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }
}

fn grid_dimension(level: i32, name: &str, value: i32, max: Option<usize>) -> Result<usize> {
    let value = value.max(0) as usize;
    match max {
        Some(max) if value > max => Err(LevelError::InvalidLevel(format!(
            "level {level}: {name} = {value} exceeds {max}"
        ))),
        _ => Ok(value),
    }
}

impl From<&GoalDto> for Goal {
    fn from(dto: &GoalDto) -> Self {
        Self {
            goal_type: dto.goal_type,
            target_count: dto.target_count,
            target_color: dto.target_color,
        }
    }
}

impl From<&CellDto> for Cell {
    fn from(dto: &CellDto) -> Self {
        Self {
            is_empty: dto.is_empty,
            element_type: dto.element_type,
            gate_direction: dto.gate_direction,
            ice_hit_points: dto.ice_hit_points,
            screw_hit_points: dto.screw_hit_points,
            lock_item_count: dto.lock_item_count,
            lock_item_color: dto.lock_item_color,
            colors: dto.colors.clone(),
            gate_waves: dto.gate_waves.iter().map(GateWave::from).collect(),
        }
    }
}

impl From<&GateWaveDto> for GateWave {
    fn from(dto: &GateWaveDto) -> Self {
        Self {
            colors: dto.colors.clone(),
        }
    }
}

impl From<&Level> for LevelConfigDto {
    fn from(level: &Level) -> Self {
        let grid = (0..level.columns())
            .map(|column| {
                level
                    .grid
                    .column(column)
                    .unwrap_or_default()
                    .iter()
                    .map(|cell| Some(CellDto::from(cell)))
                    .collect()
            })
            .collect();

        Self {
            level: level.level as i32,
            rows: level.rows() as i32,
            columns: level.columns() as i32,
            total_slot: level.total_slot,
            goals: level.goals.iter().map(GoalDto::from).collect(),
            containers: level.containers.clone(),
            grid,
        }
    }
}

impl From<&Goal> for GoalDto {
    fn from(goal: &Goal) -> Self {
        Self {
            goal_type: goal.goal_type,
            target_count: goal.target_count,
            target_color: goal.target_color,
        }
    }
}

impl From<&Cell> for CellDto {
    fn from(cell: &Cell) -> Self {
        Self {
            is_empty: cell.is_empty,
            element_type: cell.element_type,
            gate_direction: cell.gate_direction,
            ice_hit_points: cell.ice_hit_points,
            screw_hit_points: cell.screw_hit_points,
            lock_item_count: cell.lock_item_count,
            lock_item_color: cell.lock_item_color,
            colors: cell.colors.clone(),
            gate_waves: cell
                .gate_waves
                .iter()
                .map(|wave| GateWaveDto {
                    colors: wave.colors.clone(),
                })
                .collect(),
        }
    }
}
