#[cfg(test)]
mod syntax {
    use std::collections::HashSet;

    use edify::language::{Expr, Seq};
    use edify::loading::segment;
    use edify::parsing::{parse_fragments, ParsingError};

    fn parse_with_ops(content: &str, ops: &[&str]) -> Result<Seq<'static>, ParsingError> {
        let names: HashSet<String> = ops
            .iter()
            .map(|name| name.to_string())
            .collect();
        let content: &'static str = Box::leak(
            content
                .to_string()
                .into_boxed_str(),
        );
        parse_fragments(&segment(content), &names)
    }

    fn parse(content: &str) -> Result<Seq<'static>, ParsingError> {
        parse_with_ops(content, &[])
    }

    #[test]
    fn empty_list_is_allowed() {
        let stepped = parse("Let _x_ be «».").unwrap();
        let found = stepped
            .items
            .iter()
            .any(|item| matches!(item, Expr::List(list) if list.elements.is_empty()));
        assert!(found, "no empty list in {:?}", stepped);
    }

    #[test]
    fn list_elements_split_on_commas() {
        let stepped = parse("Let _x_ be «1, 2, 3».").unwrap();
        let lists: Vec<_> = stepped
            .items
            .iter()
            .filter_map(|item| match item {
                Expr::List(list) => Some(list),
                _ => None,
            })
            .collect();
        assert_eq!(lists.len(), 1);
        assert_eq!(
            lists[0]
                .elements
                .len(),
            3
        );
    }

    #[test]
    fn a_variable_can_be_a_callee() {
        let stepped = parse("Let _y_ be _foo_().").unwrap();
        let found = stepped
            .items
            .iter()
            .any(|item| matches!(item, Expr::Call(call) if call.callee == "foo"));
        assert!(found, "no call to foo in {:?}", stepped);
    }

    #[test]
    fn unclosed_parenthesis_reports_eof() {
        let failure = parse("Let (.").unwrap_err();
        assert_eq!(
            failure.message(),
            "unexpected eof (expected close parenthesis)"
        );
        assert_eq!(failure.offset(), 6);
    }

    #[test]
    fn records_with_values_and_without() {
        let stepped = parse("Let _r_ be { [[Kind]]: 1, [[Target]]: 2 }.").unwrap();
        let found = stepped
            .items
            .iter()
            .any(|item| {
                matches!(item, Expr::Record(record) if record
                    .members
                    .len()
                    == 2)
            });
        assert!(found, "no two-member record in {:?}", stepped);

        let stepped = parse("a Record of the form { [[A]], [[B]] }").unwrap();
        let found = stepped
            .items
            .iter()
            .any(|item| matches!(item, Expr::RecordSpec(spec) if spec.names == vec!["A", "B"]));
        assert!(found, "no record spec in {:?}", stepped);
    }

    #[test]
    fn record_members_cannot_repeat_or_mix() {
        let failure = parse("Let _r_ be { [[A]]: 1, [[A]]: 2 }.").unwrap_err();
        assert!(matches!(
            failure,
            ParsingError::DuplicateRecordMember(_, ref name) if name == "A"
        ));

        let failure = parse("Let _r_ be { [[A]]: 1, [[B]] }.").unwrap_err();
        assert!(matches!(failure, ParsingError::MixedRecordMembers(_)));
    }

    #[test]
    fn sdo_invocations_need_a_known_callee() {
        let stepped = parse_with_ops("Let _v_ be StringValue of _x_.", &["StringValue"]).unwrap();
        let found = stepped
            .items
            .iter()
            .any(|item| matches!(item, Expr::SdoCall(call) if call.callee == "StringValue"));
        assert!(found, "no sdo call in {:?}", stepped);

        // an unknown name before "of" stays prose
        let stepped = parse("Let _v_ be StringValue of _x_.").unwrap();
        let none = stepped
            .items
            .iter()
            .all(|item| !matches!(item, Expr::SdoCall(_)));
        assert!(none, "unexpected sdo call in {:?}", stepped);
    }

    #[test]
    fn trailing_comma_needs_a_line_break() {
        assert!(parse("Let _x_ be «1,\n».").is_ok());
        assert!(parse("Let _x_ be «1,».").is_err());
    }

    #[test]
    fn doubled_separators_are_not_blank_elements() {
        let failure = parse("Let _x_ be «1,,2».").unwrap_err();
        assert!(matches!(failure, ParsingError::MissingContent(_, "a list element")));

        let failure = parse("Let _x_ be Foo(, *1*).").unwrap_err();
        assert!(matches!(failure, ParsingError::MissingContent(_, "an argument")));
    }

    #[test]
    fn calls_nest() {
        let stepped = parse_with_ops(
            "Let _x_ be Outer(Inner(1), 2).",
            &["Outer", "Inner"],
        )
        .unwrap();
        let outer = stepped
            .items
            .iter()
            .find_map(|item| match item {
                Expr::Call(call) if call.callee == "Outer" => Some(call),
                _ => None,
            })
            .expect("no call to Outer");
        assert_eq!(
            outer
                .arguments
                .len(),
            2
        );
        let inner = outer.arguments[0]
            .items
            .iter()
            .any(|item| matches!(item, Expr::Call(call) if call.callee == "Inner"));
        assert!(inner, "no nested call in {:?}", outer);
    }
}
