//! Tabular presentation of coupons and statistics.

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::draw::GeneratedCoupon;
use crate::stats::ResultsStatistic;

pub fn tabulate_coupons(coupons: &[GeneratedCoupon], numbers_count: usize) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default()
                    .with(Separator(true))
                    .with(MinWidth(5))
                    .with(HAlign::Right),
            )];
            for _ in 0..numbers_count {
                cols.push(Col::new(
                    Styles::default().with(MinWidth(4)).with(HAlign::Right),
                ));
            }
            cols
        })
        .with_row({
            let mut header_cells = vec!["#".into()];
            for position in 0..numbers_count {
                header_cells.push(format!("{}", position + 1).into());
            }
            Row::new(
                Styles::default().with(Header(true)).with(Separator(true)),
                header_cells,
            )
        });

    for (index, coupon) in coupons.iter().enumerate() {
        let mut row_cells = vec![format!("{}", index + 1).into()];
        for number in coupon.numbers() {
            row_cells.push(format!("{number}").into());
        }
        table.push_row(Row::new(Styles::default(), row_cells));
    }
    table
}

/// Per-position age statistics alongside the envelope they yield at `std_dev_factor`.
pub fn tabulate_statistic(statistic: &ResultsStatistic, std_dev_factor: f64) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Position".into(),
                "Avg age".into(),
                "Std dev".into(),
                "Bottom".into(),
                "Top".into(),
            ],
        ));

    for position in 0..statistic.positions() {
        let envelope = statistic.envelope(position, std_dev_factor);
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{}", position + 1).into(),
                format!("{:.3}", statistic.average[position]).into(),
                format!("{:.3}", statistic.standard_deviation[position]).into(),
                format!("{}", envelope.bottom).into(),
                format!("{}", envelope.top).into(),
            ],
        ));
    }
    table
}
