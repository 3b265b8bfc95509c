#[cfg(test)]
mod verify {
    use edify::analysis::Analyzer;
    use edify::loading::outline;
    use edify::problem::Diagnostic;

    const HEADERS: &str = "\
operation Fallible() returns either a normal completion containing a Number or an abrupt completion
operation Tidy() returns a Number
operation SideEffect() returns ~unused~
operation Add(_x_: a Number, _y_: a Number) returns a Number
operation Completion(_completionRecord_)
sdo Evaluation() returns an ECMAScript language value
";

    fn check(body: &str) -> Vec<Diagnostic> {
        let source = format!("{}\n{}", HEADERS, body);
        let outlined = outline(&source);
        assert_eq!(outlined.problems, vec![], "outline of {:?}", body);

        let mut found = Vec::new();
        let mut analyzer = Analyzer::new(&outlined.biblio);
        for algorithm in &outlined.algorithms {
            analyzer.check_algorithm(algorithm, &mut found);
        }
        analyzer.finish(&mut found);
        found
    }

    fn rules(found: &[Diagnostic]) -> Vec<&'static str> {
        found
            .iter()
            .map(|diagnostic| diagnostic.rule)
            .collect()
    }

    #[test]
    fn a_clean_document_is_silent() {
        let found = check(
            "algorithm Add:\n\
             \x20 1. Let _sum_ be ! Fallible().\n\
             \x20 2. Let _other_ be ? Fallible().\n\
             \x20 3. Perform SideEffect().\n\
             \x20 4. Return Add(_sum_, *1*).\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn unconsumed_completion_warns_once() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be Fallible().\n",
        );
        assert_eq!(rules(&found), vec!["completion-consumption"]);
        assert_eq!(
            found[0].message,
            "Fallible returns a Completion Record, but is not consumed as if it does"
        );
    }

    #[test]
    fn markers_and_completion_wrapping_count_as_consumption() {
        for step in [
            "1. Let _x_ be ! Fallible().",
            "1. Let _x_ be ? Fallible().",
            "1. Return Completion(Fallible()).",
        ] {
            let found = check(&format!("algorithm:\n  {}\n", step));
            assert!(
                !rules(&found).contains(&"completion-consumption"),
                "{:?} for step {}",
                found,
                step
            );
        }
    }

    #[test]
    fn undefined_callees_are_reported() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be _foo_().\n",
        );
        assert_eq!(rules(&found), vec!["undefined-callee"]);
        assert_eq!(found[0].message, "could not find definition for foo");
    }

    #[test]
    fn argument_counts_are_enforced() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be Add(*1*).\n",
        );
        assert_eq!(rules(&found), vec!["argument-count"]);
        assert_eq!(
            found[0].message,
            "Add takes 2 arguments, but this invocation passes 1"
        );
    }

    #[test]
    fn invocation_kind_must_match_the_declaration() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be Evaluation(_n_).\n",
        );
        assert!(rules(&found).contains(&"invocation-kind"));

        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be Evaluation of _n_.\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn unused_operations_need_perform() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be SideEffect().\n",
        );
        assert_eq!(rules(&found), vec!["perform-unused"]);

        let found = check(
            "algorithm:\n\
             \x20 1. Perform SideEffect().\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn operations_only_ever_performed_are_flagged_once() {
        let found = check(
            "algorithm:\n\
             \x20 1. Perform Tidy().\n\
             \x20 2. Perform Tidy().\n",
        );
        assert_eq!(rules(&found), vec!["always-performed"]);
        assert_eq!(
            found[0].message,
            "every invocation of Tidy uses Perform; consider declaring its return type as ~unused~"
        );
        // the diagnostic points at the declaring header
        assert_eq!(found[0].offset, HEADERS.find("operation Tidy").unwrap());
    }

    #[test]
    fn one_direct_use_disqualifies_the_suggestion() {
        let found = check(
            "algorithm:\n\
             \x20 1. Perform Tidy().\n\
             \x20 2. Let _x_ be Tidy().\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn operations_only_ever_asserted_are_flagged() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be ! Fallible().\n",
        );
        assert_eq!(rules(&found), vec!["always-asserted"]);
        assert_eq!(
            found[0].message,
            "every invocation of Fallible is unwrapped with !; \
             consider declaring its return type as a Number"
        );

        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be ? Fallible().\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn implausible_arguments_are_reported() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let _x_ be Add(*\"one\"*, *2*).\n",
        );
        assert_eq!(rules(&found), vec!["argument-type"]);
    }

    #[test]
    fn implausible_return_values_are_reported() {
        let found = check(
            "algorithm Add:\n\
             \x20 1. Return *true*.\n",
        );
        assert_eq!(rules(&found), vec!["return-type"]);

        let found = check(
            "algorithm Add:\n\
             \x20 1. Return *7*.\n",
        );
        assert_eq!(found, vec![]);
    }

    #[test]
    fn a_broken_step_does_not_stop_the_document() {
        let found = check(
            "algorithm:\n\
             \x20 1. Let (.\n\
             \x20 2. Let _x_ be SideEffect().\n",
        );
        assert_eq!(rules(&found), vec!["invalid-step", "perform-unused"]);
        assert_eq!(
            found[0].message,
            "unexpected eof (expected close parenthesis)"
        );
    }
}
