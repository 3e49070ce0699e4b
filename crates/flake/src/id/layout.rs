use core::fmt;

pub(crate) struct FieldLayout {
    pub name: &'static str,
    pub bits: u8,
    pub value: u64,
}

/// Renders a packed ID as an ASCII table, one column per bit field.
pub(crate) fn write_bit_layout(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    raw: u64,
    fields: &[FieldLayout],
) -> fmt::Result {
    // Widest of label, decimal and hex, plus one space either side
    let columns: Vec<usize> = fields
        .iter()
        .map(|field| {
            let label_len = format!("{} ({})", field.name, field.bits).len();
            let dec_len = field.value.to_string().len();
            let hex_len = format!("0x{:x}", field.value).len();
            label_len.max(dec_len).max(hex_len) + 2
        })
        .collect();

    fn center(s: impl ToString, width: usize) -> String {
        let s = s.to_string();
        let pad = width.saturating_sub(s.len());
        let left = pad / 2;
        format!("{}{}{}", " ".repeat(left), s, " ".repeat(pad - left))
    }

    fn border(f: &mut fmt::Formatter<'_>, columns: &[usize]) -> fmt::Result {
        write!(f, "        +")?;
        for &w in columns {
            write!(f, "{}+", "-".repeat(w))?;
        }
        writeln!(f)
    }

    fn row(
        f: &mut fmt::Formatter<'_>,
        columns: &[usize],
        cells: impl Iterator<Item = String>,
    ) -> fmt::Result {
        write!(f, "        |")?;
        for (cell, &w) in cells.zip(columns) {
            write!(f, "{}|", center(cell, w))?;
        }
        writeln!(f)
    }

    writeln!(f, "{type_name} {{")?;
    writeln!(f, "    raw id     : 0x{raw:016x} ({raw})")?;
    writeln!(f, "    layout     :")?;
    border(f, &columns)?;
    row(
        f,
        &columns,
        fields.iter().map(|x| format!("{} ({})", x.name, x.bits)),
    )?;
    border(f, &columns)?;
    row(f, &columns, fields.iter().map(|x| x.value.to_string()))?;
    row(f, &columns, fields.iter().map(|x| format!("0x{:x}", x.value)))?;
    border(f, &columns)?;
    write!(f, "}}")
}
