//! Shared helper functions for the utilities
//!
//! Small formatting pieces used by more than one utility.

use console::measure_text_width;

use crate::core::UtilError;

/// Lay `items` out in columns, filled top to bottom then left to right,
/// using as many columns as fit in `width`.
///
/// Width is measured without ANSI styling, so coloured names line up.
pub fn grid(items: &[String], width: usize) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }
    let widths: Vec<usize> = items.iter().map(|s| measure_text_width(s)).collect();
    const GAP: usize = 2;

    let mut layout = (1, items.len(), vec![0]);
    for cols in (1..=items.len()).rev() {
        let rows = items.len().div_ceil(cols);
        // Columns actually used after filling column-major
        let used = items.len().div_ceil(rows);
        let col_widths: Vec<usize> = (0..used)
            .map(|c| {
                widths[c * rows..((c + 1) * rows).min(items.len())]
                    .iter()
                    .copied()
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total: usize = col_widths.iter().sum::<usize>() + GAP * (used - 1);
        if total <= width || cols == 1 {
            layout = (used, rows, col_widths);
            break;
        }
    }

    let (cols, rows, col_widths) = layout;
    let mut lines = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut line = String::new();
        for c in 0..cols {
            let idx = c * rows + r;
            let Some(item) = items.get(idx) else {
                break;
            };
            line.push_str(item);
            let is_last = c + 1 == cols || (c + 1) * rows + r >= items.len();
            if !is_last {
                line.push_str(&" ".repeat(col_widths[c] - widths[idx] + GAP));
            }
        }
        lines.push(line);
    }
    lines
}

/// Parse a block size such as `1024`, `K`, `4K`, `M`, `1G` into bytes.
pub fn parse_block_size(text: &str) -> Result<u64, UtilError> {
    let text = text.trim();
    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, suffix) = text.split_at(split);

    let count: u64 = if digits.is_empty() {
        1
    } else {
        digits
            .parse()
            .map_err(|_| UtilError::usage(format!("invalid block size '{text}'")))?
    };
    let unit: u64 = match suffix.to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        _ => return Err(UtilError::usage(format!("invalid block size '{text}'"))),
    };

    match count.checked_mul(unit) {
        Some(0) | None => Err(UtilError::usage(format!("invalid block size '{text}'"))),
        Some(bytes) => Ok(bytes),
    }
}

/// Bytes to whole blocks of `block`, rounding up.
pub fn to_blocks(bytes: u64, block: u64) -> u64 {
    bytes.div_ceil(block.max(1))
}
