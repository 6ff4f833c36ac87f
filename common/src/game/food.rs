use super::session_rng::SessionRng;
use super::snake::Snake;
use super::types::{Cell, Grid};

/// Rejection-samples a uniformly random free cell. Returns `None` only when the
/// snake covers the whole grid, so the loop always has a free cell to hit.
pub fn place_food(grid: &Grid, snake: &Snake, rng: &mut SessionRng) -> Option<Cell> {
    if snake.len() >= grid.cell_count() {
        return None;
    }

    loop {
        let candidate = Cell::new(
            rng.random_range(0..grid.width),
            rng.random_range(0..grid.height),
        );
        if !snake.contains(candidate) {
            return Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_food_is_inside_grid_and_off_snake() {
        let grid = Grid::square(20);
        let snake = Snake::from_cells([Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]).unwrap();
        let mut rng = SessionRng::new(42);
        for _ in 0..500 {
            let food = place_food(&grid, &snake, &mut rng).unwrap();
            assert!(grid.contains(food));
            assert!(!snake.contains(food));
        }
    }

    #[test]
    fn test_single_free_cell_is_found() {
        let grid = Grid::square(3);
        let cells: Vec<Cell> = (0..3)
            .flat_map(|y| (0..3).map(move |x| Cell::new(x, y)))
            .filter(|c| *c != Cell::new(2, 2))
            .collect();
        let snake = Snake::from_cells(cells).unwrap();
        let mut rng = SessionRng::new(7);
        assert_eq!(place_food(&grid, &snake, &mut rng), Some(Cell::new(2, 2)));
    }

    #[test]
    fn test_full_grid_has_no_food() {
        let grid = Grid::square(2);
        let snake = Snake::from_cells([
            Cell::new(0, 0),
            Cell::new(1, 0),
            Cell::new(1, 1),
            Cell::new(0, 1),
        ])
        .unwrap();
        let mut rng = SessionRng::new(1);
        assert_eq!(place_food(&grid, &snake, &mut rng), None);
    }

    #[test]
    fn test_same_seed_same_food() {
        let grid = Grid::square(20);
        let snake = Snake::from_cells([Cell::new(10, 10)]).unwrap();
        let mut first = SessionRng::new(99);
        let mut second = SessionRng::new(99);
        assert_eq!(
            place_food(&grid, &snake, &mut first),
            place_food(&grid, &snake, &mut second)
        );
    }
}
