use core_types::{CanvasPlan, Placement, SourceSize, Strategy};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("No images were supplied")]
    EmptyInput,

    #[error("Unknown layout strategy: {0}")]
    UnknownStrategy(String),

    #[error("Canvas dimensions would exceed {} pixels per side", u32::MAX)]
    CanvasTooLarge,
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Parse a user-facing strategy tag, ignoring case and surrounding whitespace.
pub fn parse_strategy(tag: &str) -> Result<Strategy> {
    match tag.trim().to_ascii_lowercase().as_str() {
        "grid" => Ok(Strategy::Grid),
        "horizontal" => Ok(Strategy::Horizontal),
        "vertical" => Ok(Strategy::Vertical),
        _ => Err(LayoutError::UnknownStrategy(tag.trim().to_string())),
    }
}

/// Compute the canvas size and per-image placements for `sizes` under
/// `strategy`.
///
/// Placements come back in source order, one per input. The planner never
/// touches pixel data; it fails with [`LayoutError::EmptyInput`] when `sizes`
/// is empty and with [`LayoutError::CanvasTooLarge`] when the combined
/// dimensions would not fit in a `u32` canvas.
pub fn plan(sizes: &[SourceSize], strategy: Strategy) -> Result<CanvasPlan> {
    if sizes.is_empty() {
        return Err(LayoutError::EmptyInput);
    }

    // A single image fills a canvas of its own dimensions under every
    // strategy, including Grid, whose general formula would over-allocate.
    if sizes.len() == 1 {
        return Ok(CanvasPlan {
            canvas_width: sizes[0].width,
            canvas_height: sizes[0].height,
            placements: vec![Placement {
                image_index: 0,
                x: 0,
                y: 0,
            }],
        });
    }

    match strategy {
        Strategy::Grid => grid_plan(sizes),
        Strategy::Horizontal => horizontal_plan(sizes),
        Strategy::Vertical => vertical_plan(sizes),
    }
}

fn grid_plan(sizes: &[SourceSize]) -> Result<CanvasPlan> {
    let side = grid_side(sizes.len());

    // Every cell uses the first image's dimensions. Sources larger than the
    // cell overflow it and are clipped against the canvas when stamped.
    let cell_width = sizes[0].width;
    let cell_height = sizes[0].height;

    let canvas_width = side
        .checked_mul(cell_width)
        .ok_or(LayoutError::CanvasTooLarge)?;
    let canvas_height = side
        .checked_mul(cell_height)
        .ok_or(LayoutError::CanvasTooLarge)?;

    // Cell coordinates stay below the checked canvas size.
    let placements = (0..sizes.len())
        .map(|index| Placement {
            image_index: index,
            x: (index as u32 % side) * cell_width,
            y: (index as u32 / side) * cell_height,
        })
        .collect();

    Ok(CanvasPlan {
        canvas_width,
        canvas_height,
        placements,
    })
}

// floor(sqrt(n)) + 1 over-allocates so that side * side >= n for all n >= 1.
fn grid_side(count: usize) -> u32 {
    (count as f64).sqrt().floor() as u32 + 1
}

fn horizontal_plan(sizes: &[SourceSize]) -> Result<CanvasPlan> {
    let canvas_width = sizes
        .iter()
        .try_fold(0u32, |acc, size| acc.checked_add(size.width))
        .ok_or(LayoutError::CanvasTooLarge)?;
    let canvas_height = sizes
        .iter()
        .map(|size| size.height)
        .max()
        .expect("sizes checked non-empty");

    // Offsets are prefix sums of the checked total, so they cannot overflow.
    let mut placements = Vec::with_capacity(sizes.len());
    let mut x = 0;
    for (index, size) in sizes.iter().enumerate() {
        placements.push(Placement {
            image_index: index,
            x,
            y: 0,
        });
        x += size.width;
    }

    Ok(CanvasPlan {
        canvas_width,
        canvas_height,
        placements,
    })
}

fn vertical_plan(sizes: &[SourceSize]) -> Result<CanvasPlan> {
    let canvas_width = sizes
        .iter()
        .map(|size| size.width)
        .max()
        .expect("sizes checked non-empty");
    let canvas_height = sizes
        .iter()
        .try_fold(0u32, |acc, size| acc.checked_add(size.height))
        .ok_or(LayoutError::CanvasTooLarge)?;

    // Offsets are prefix sums of the checked total, so they cannot overflow.
    let mut placements = Vec::with_capacity(sizes.len());
    let mut y = 0;
    for (index, size) in sizes.iter().enumerate() {
        placements.push(Placement {
            image_index: index,
            x: 0,
            y,
        });
        y += size.height;
    }

    Ok(CanvasPlan {
        canvas_width,
        canvas_height,
        placements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(dims: &[(u32, u32)]) -> Vec<SourceSize> {
        dims.iter()
            .map(|&(width, height)| SourceSize { width, height })
            .collect()
    }

    fn offsets(plan: &CanvasPlan) -> Vec<(u32, u32)> {
        plan.placements.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn horizontal_sums_widths_and_takes_max_height() {
        let plan = plan(&sizes(&[(100, 50), (80, 60), (120, 40)]), Strategy::Horizontal).unwrap();
        assert_eq!(plan.canvas_width, 300);
        assert_eq!(plan.canvas_height, 60);
        assert_eq!(offsets(&plan), vec![(0, 0), (100, 0), (180, 0)]);
    }

    #[test]
    fn vertical_stacks_heights_and_takes_max_width() {
        let plan = plan(&sizes(&[(100, 50), (80, 60), (120, 40)]), Strategy::Vertical).unwrap();
        assert_eq!(plan.canvas_width, 120);
        assert_eq!(plan.canvas_height, 150);
        assert_eq!(offsets(&plan), vec![(0, 0), (0, 50), (0, 110)]);
    }

    #[test]
    fn grid_places_row_major_with_uniform_cells() {
        let plan = plan(&sizes(&[(50, 50); 4]), Strategy::Grid).unwrap();
        assert_eq!(plan.canvas_width, 150);
        assert_eq!(plan.canvas_height, 150);
        assert_eq!(offsets(&plan), vec![(0, 0), (50, 0), (100, 0), (0, 50)]);
    }

    #[test]
    fn grid_side_over_allocates() {
        for (count, side) in [(2u32, 2u32), (5, 3), (9, 4), (10, 4)] {
            let dims = vec![SourceSize { width: 10, height: 10 }; count as usize];
            let plan = plan(&dims, Strategy::Grid).unwrap();
            assert_eq!(plan.canvas_width, side * 10, "count={count}");
            assert!(side * side >= count);
        }
    }

    #[test]
    fn grid_cells_come_from_the_first_image() {
        let plan = plan(&sizes(&[(10, 20), (50, 50)]), Strategy::Grid).unwrap();
        assert_eq!(plan.canvas_width, 20);
        assert_eq!(plan.canvas_height, 40);
        // The oversized second image still gets plain cell coordinates.
        assert_eq!(plan.placements[1].x, 10);
        assert_eq!(plan.placements[1].y, 0);
    }

    #[test]
    fn single_image_is_identity_under_every_strategy() {
        for strategy in [Strategy::Grid, Strategy::Horizontal, Strategy::Vertical] {
            let plan = plan(&sizes(&[(37, 91)]), strategy).unwrap();
            assert_eq!(plan.canvas_width, 37);
            assert_eq!(plan.canvas_height, 91);
            assert_eq!(plan.placements.len(), 1);
            assert_eq!(plan.placements[0].image_index, 0);
            assert_eq!(offsets(&plan), vec![(0, 0)]);
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        for strategy in [Strategy::Grid, Strategy::Horizontal, Strategy::Vertical] {
            let err = plan(&[], strategy).unwrap_err();
            assert!(matches!(err, LayoutError::EmptyInput));
        }
    }

    #[test]
    fn overflowing_canvas_dimensions_are_rejected() {
        let cases = [
            (vec![(u32::MAX, 1), (2, 1)], Strategy::Horizontal),
            (vec![(1, u32::MAX), (1, 2)], Strategy::Vertical),
            (vec![(u32::MAX / 2 + 1, 1), (1, 1)], Strategy::Grid),
        ];
        for (dims, strategy) in cases {
            let err = plan(&sizes(&dims), strategy).unwrap_err();
            assert!(matches!(err, LayoutError::CanvasTooLarge), "{strategy:?}");
        }
    }

    #[test]
    fn canvas_at_the_limit_still_plans() {
        let plan = plan(&sizes(&[(u32::MAX - 1, 1), (1, 1)]), Strategy::Horizontal).unwrap();
        assert_eq!(plan.canvas_width, u32::MAX);
        assert_eq!(plan.placements[1].x, u32::MAX - 1);
    }

    #[test]
    fn placements_stay_in_source_order() {
        let plan = plan(&sizes(&[(10, 10); 7]), Strategy::Grid).unwrap();
        let indices: Vec<usize> = plan.placements.iter().map(|p| p.image_index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn parse_strategy_is_case_insensitive() {
        assert!(matches!(parse_strategy("grid"), Ok(Strategy::Grid)));
        assert!(matches!(parse_strategy("GRID"), Ok(Strategy::Grid)));
        assert!(matches!(parse_strategy(" Horizontal "), Ok(Strategy::Horizontal)));
        assert!(matches!(parse_strategy("vertical"), Ok(Strategy::Vertical)));
    }

    #[test]
    fn parse_strategy_rejects_unknown_tags() {
        match parse_strategy("diagonal").unwrap_err() {
            LayoutError::UnknownStrategy(tag) => assert_eq!(tag, "diagonal"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
