use bomber_core::Position;

/// Dense square grid addressed by board [`Position`]s.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid<T> {
    size: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub(crate) fn new(size: usize, fill: T) -> Self {
        Self {
            size,
            cells: vec![fill; size * size],
        }
    }

    pub(crate) fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }
}

impl<T> Grid<T> {
    pub(crate) fn from_cells(size: usize, cells: Vec<T>) -> Option<Self> {
        (cells.len() == size * size).then_some(Self { size, cells })
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Reports whether `position` lies on the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Value stored at `position`, if it lies on the grid.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<&T> {
        self.index(position).and_then(|index| self.cells.get(index))
    }

    /// Rows of the grid from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Every cell paired with its position in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        let size = self.size.max(1);
        self.cells.iter().enumerate().map(move |(index, value)| {
            let x = i32::try_from(index % size).unwrap_or(i32::MAX);
            let y = i32::try_from(index / size).unwrap_or(i32::MAX);
            (Position::new(x, y), value)
        })
    }

    pub(crate) fn set(&mut self, position: Position, value: T) {
        if let Some(slot) = self.get_mut(position) {
            *slot = value;
        }
    }

    pub(crate) fn get_mut(&mut self, position: Position) -> Option<&mut T> {
        self.index(position).and_then(|index| self.cells.get_mut(index))
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x()).ok()?;
        let y = usize::try_from(position.y()).ok()?;
        (x < self.size && y < self.size).then(|| y * self.size + x)
    }
}

impl<T: Copy> Grid<T> {
    /// Copy of the value stored at `position`, if it lies on the grid.
    #[must_use]
    pub fn at(&self, position: Position) -> Option<T> {
        self.get(position).copied()
    }
}

impl<T: Copy + Into<i64>> Grid<T> {
    /// Rows of the grid widened to plain integers.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.rows()
            .map(|row| row.iter().map(|value| (*value).into()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_positions_are_rejected() {
        let mut grid = Grid::new(3, 0_u32);
        grid.set(Position::new(2, 1), 7);
        grid.set(Position::new(3, 0), 9);
        grid.set(Position::new(-1, 0), 9);
        assert_eq!(grid.at(Position::new(2, 1)), Some(7));
        assert_eq!(grid.at(Position::new(3, 0)), None);
        assert!(!grid.contains(Position::new(0, -1)));
        assert_eq!(grid.iter().filter(|(_, value)| **value == 9).count(), 0);
    }

    #[test]
    fn rows_are_row_major() {
        let grid = Grid::from_cells(2, vec![1_u32, 2, 3, 4]).expect("square");
        let rows: Vec<&[u32]> = grid.rows().collect();
        assert_eq!(rows, vec![&[1, 2][..], &[3, 4][..]]);
        let (position, value) = grid.iter().nth(2).expect("third cell");
        assert_eq!((position, *value), (Position::new(0, 1), 3));
        assert!(Grid::from_cells(2, vec![1_u32]).is_none());
    }
}
