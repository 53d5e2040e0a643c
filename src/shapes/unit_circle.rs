use std::f64::consts::FRAC_1_SQRT_2;

/// Eight evenly spaced directions used by the round shapes' supports.
pub const UNIT_CIRCLE: [(f64, f64); 8] = [
    (1.0, 0.0),
    (FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    (0.0, -1.0),
    (FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// Feature id of circle point `index`; neighbouring points share a bit.
pub fn circle_feature_id(index: usize) -> u32 {
    if index == 0 {
        0x81
    } else {
        0xC0 >> (7 - index)
    }
}

fn circle_dot(index: usize, horizontal: (f64, f64)) -> f64 {
    UNIT_CIRCLE[index].0 * horizontal.0 + UNIT_CIRCLE[index].1 * horizontal.1
}

/// Index of the circle point furthest along `horizontal`, found with a coarse-to-fine walk.
pub fn furthest_circle_index(horizontal: (f64, f64)) -> usize {
    let mut circle_index = 0;
    let mut current_dot = circle_dot(0, horizontal);

    if current_dot < 0.0 {
        circle_index = 4;
        current_dot = -current_dot;
    }

    for offset in [2usize, 1] {
        let next_index = (circle_index + offset) & 0x7;
        let prev_index = (circle_index + 8 - offset) & 0x7;

        let next_dot = circle_dot(next_index, horizontal);
        let prev_dot = circle_dot(prev_index, horizontal);

        if next_dot > current_dot {
            circle_index = next_index;
            current_dot = next_dot;
        }

        if prev_dot > current_dot {
            circle_index = prev_index;
            current_dot = prev_dot;
        }
    }

    circle_index
}
