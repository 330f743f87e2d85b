use api::analytics::concentration::{self, Holding};

fn equity(name: &str, ratio: f64) -> Holding {
    Holding {
        security_name: name.to_string(),
        holding_ratio: ratio,
        security_type: "equity".to_string(),
    }
}

fn bond(name: &str, ratio: f64) -> Holding {
    Holding {
        security_name: name.to_string(),
        holding_ratio: ratio,
        security_type: "bond".to_string(),
    }
}

#[test]
fn non_equity_holdings_are_ignored() {
    let holdings = vec![equity("AAAA One", 10.0), bond("Treasury 10Y", 50.0)];
    let out = concentration::analyze(&holdings);
    assert_eq!(out.top5_ratio, 10.0);
    assert_eq!(out.top10_ratio, 10.0);
}

#[test]
fn top_ratios_do_not_depend_on_input_order() {
    // deliberately unsorted: the component must re-sort by ratio
    let holdings = vec![
        equity("CCCC Corp", 2.0),
        equity("AAAA Corp", 9.0),
        equity("FFFF Corp", 1.0),
        equity("BBBB Corp", 8.0),
        equity("EEEE Corp", 3.0),
        equity("DDDD Corp", 5.0),
        equity("GGGG Corp", 0.5),
    ];
    let out = concentration::analyze(&holdings);
    // top5 = 9 + 8 + 5 + 3 + 2
    assert_eq!(out.top5_ratio, 27.0);
    assert_eq!(out.top10_ratio, 28.5);
}

#[test]
fn industry_breakdown_groups_by_name_prefix() {
    let holdings = vec![
        equity("Bank of East", 10.0),
        equity("Bank of West", 5.0),
        equity("Tech Alpha", 7.0),
    ];
    let out = concentration::analyze(&holdings);

    assert_eq!(out.industry_breakdown.len(), 2);
    assert_eq!(out.industry_breakdown[0].industry, "Bank");
    assert_eq!(out.industry_breakdown[0].ratio, 15.0);
    assert_eq!(out.industry_breakdown[1].industry, "Tech");
    assert_eq!(out.industry_breakdown[1].ratio, 7.0);
}

#[test]
fn industry_breakdown_keeps_top_ten_groups() {
    let mut holdings = Vec::new();
    for i in 0..15 {
        holdings.push(equity(&format!("GR{i:02} Corp"), (i + 1) as f64));
    }
    let out = concentration::analyze(&holdings);
    assert_eq!(out.industry_breakdown.len(), 10);
    // descending by grouped ratio
    for pair in out.industry_breakdown.windows(2) {
        assert!(pair[0].ratio >= pair[1].ratio);
    }
}

#[test]
fn empty_holdings_yield_zeros() {
    let out = concentration::analyze(&[]);
    assert_eq!(out.top5_ratio, 0.0);
    assert_eq!(out.top10_ratio, 0.0);
    assert!(out.industry_breakdown.is_empty());
}

#[test]
fn concentration_level_thresholds() {
    assert_eq!(concentration::concentration_level(75.0), "high");
    assert_eq!(concentration::concentration_level(70.0), "medium");
    assert_eq!(concentration::concentration_level(50.5), "medium");
    assert_eq!(concentration::concentration_level(50.0), "low");
}
