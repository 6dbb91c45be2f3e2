use sheetcalc_formula::{Ast, Position};

#[test]
fn position_round_trip_over_a_sample_of_the_address_space() {
    let samples = [
        "A1", "B2", "Z1", "AA1", "AZ1", "BA1", "ZZ1", "AAA1", "XFD1", "A16384", "XFD16384",
    ];
    for s in samples {
        let p = Position::parse(s).expect("sample address must parse");
        assert_eq!(p.format(), s, "format(parse({s})) should round-trip");
        assert_eq!(Position::parse(&p.format()).unwrap(), p);
    }
}

#[test]
fn formula_print_round_trips_through_parse() {
    let sources = [
        "1+2*3",
        "(1+2)*3",
        "A1-B1-C1",
        "A1-(B1-C1)",
        "-A1+2",
        "A1/B1/C1",
        "A1/(B1/C1)",
    ];
    for src in sources {
        let ast = Ast::parse(src).expect("sample formula must parse");
        let printed = ast.to_string();
        let reparsed = Ast::parse(&printed).expect("canonical print must re-parse");
        assert_eq!(reparsed.to_string(), printed, "print must be a fixed point");
    }
}

#[test]
fn referenced_cells_are_sorted_and_deduplicated() {
    let ast = Ast::parse("D4+A1+B2+A1+C3").unwrap();
    let refs: Vec<String> = ast.referenced_cells().iter().map(Position::format).collect();
    assert_eq!(refs, vec!["A1", "B2", "C3", "D4"]);
}
