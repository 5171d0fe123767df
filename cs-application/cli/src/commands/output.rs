//! CLI 通用输出格式化模块
//!
//! 提供 table/json 两种输出格式

use anyhow::Result;
use serde::Serialize;

const COLUMN_WIDTH: usize = 20;

/// 可输出为表格行的数据 trait
pub trait TableRow {
    /// 返回表格列标题
    fn headers() -> Vec<&'static str>;

    /// 返回该项的表格行数据
    fn row(&self) -> Vec<String>;
}

/// 按固定列宽拼接一行，超长内容截断
pub fn format_line<S: AsRef<str>>(cells: &[S]) -> String {
    cells
        .iter()
        .map(|c| {
            let c = c.as_ref();
            if c.chars().count() > COLUMN_WIDTH {
                let cut: String = c.chars().take(COLUMN_WIDTH - 1).collect();
                format!("{}~", cut)
            } else {
                format!("{:<width$}", c, width = COLUMN_WIDTH)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// 表格格式输出
pub fn print_table<T: TableRow>(items: &[T]) {
    let header_line = format_line(&T::headers());
    println!("{}", header_line);
    println!("{}", "-".repeat(header_line.len()));

    for item in items {
        println!("{}", format_line(&item.row()));
    }
}

/// JSON 格式输出
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 根据格式参数选择输出方式
pub fn output_formatted<T: TableRow + Serialize>(items: &[T], format: &str) -> Result<()> {
    match format {
        "json" => print_json(items)?,
        _ => print_table(items),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_pads_columns() {
        let line = format_line(&["ID", "名称"]);
        assert!(line.starts_with("ID "));
        assert!(line.ends_with("名称"));
        assert_eq!(line.chars().count(), COLUMN_WIDTH + 1 + 2);
    }

    #[test]
    fn test_format_line_truncates() {
        let long = "a".repeat(40);
        let line = format_line(&[long.as_str()]);
        assert_eq!(line.chars().count(), COLUMN_WIDTH);
        assert!(line.ends_with('~'));
    }
}
