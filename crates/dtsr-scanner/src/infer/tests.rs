use super::*;

#[test]
fn test_const_literals_preserved() {
    assert_eq!(infer_value("3000", true).ty, "3000");
    assert_eq!(infer_value("'hello'", true).ty, "'hello'");
    assert_eq!(infer_value("true", true).ty, "true");
    assert_eq!(infer_value("123n", true).ty, "123n");
}

#[test]
fn test_let_literals_widen() {
    assert_eq!(infer_value("3000", false).ty, "number");
    assert_eq!(infer_value("'hello'", false).ty, "string");
    assert_eq!(infer_value("false", false).ty, "boolean");
    assert_eq!(infer_value("123n", false).ty, "bigint");
}

#[test]
fn test_null_and_undefined() {
    assert_eq!(infer_value("null", false).ty, "null");
    assert_eq!(infer_value("undefined", true).ty, "undefined");
}

#[test]
fn test_guard_words() {
    assert_eq!(infer_value("BigInt(42)", true).ty, "bigint");
    assert_eq!(infer_value("Symbol.for('k')", true).ty, "symbol");
    assert_eq!(infer_value("String.raw`a${b}`", true).ty, "string");
}

#[test]
fn test_interpolated_template_widens() {
    assert_eq!(infer_value("`v${x}`", true).ty, "string");
    assert_eq!(infer_value("`plain`", true).ty, "`plain`");
    assert_eq!(infer_value("`plain`", false).ty, "string");
}

#[test]
fn test_const_array_is_readonly_tuple() {
    assert_eq!(infer_value("[1, 2]", true).ty, "readonly [1, 2]");
    assert_eq!(infer_value("['a', 'b']", true).ty, "readonly ['a', 'b']");
}

#[test]
fn test_let_array_widens_elements() {
    assert_eq!(infer_value("[1, 2]", false).ty, "number[]");
    assert_eq!(infer_value("[1, 'a']", false).ty, "(number | string)[]");
}

#[test]
fn test_element_as_const_forces_tuple() {
    let t = infer_value("[1 as const, 2 as const]", false).ty;
    assert_eq!(t, "readonly [1, 2]");
}

#[test]
fn test_empty_array() {
    assert_eq!(infer_value("[]", false).ty, "unknown[]");
    assert_eq!(infer_value("[]", true).ty, "readonly []");
}

#[test]
fn test_object_literal_const() {
    let t = infer_value("{ apiUrl: 'https://x', timeout: '5000' }", true).ty;
    assert!(t.contains("apiUrl: 'https://x';"), "missing literal: {t}");
    assert!(t.contains("timeout: '5000';"), "missing literal: {t}");
}

#[test]
fn test_object_literal_widened_with_default() {
    let r = infer_value("{ retries: 3, verbose: true }", false);
    assert!(r.ty.contains("retries: number;"), "bad type: {}", r.ty);
    assert!(r.ty.contains("verbose: boolean;"), "bad type: {}", r.ty);
    assert_eq!(r.clean.as_deref(), Some("{ retries: 3, verbose: true }"));
}

#[test]
fn test_object_method_becomes_function_type() {
    let t = infer_value("{ greet(name: string) { return name } }", false).ty;
    assert!(
        t.contains("greet: (name: string) => unknown;"),
        "bad method: {t}"
    );
}

#[test]
fn test_runtime_values_are_not_clean_defaults() {
    let r = infer_value("{ now: Date.now() }", false);
    assert!(r.ty.contains("now: unknown;"), "bad type: {}", r.ty);
    assert_eq!(r.clean.as_deref(), Some("{}"));
}

#[test]
fn test_array_default_rejected_when_it_contains_calls() {
    let r = infer_value("[getThing(), 2]", false);
    assert!(r.clean.is_none(), "call leaked into default: {:?}", r.clean);
}

#[test]
fn test_new_expressions() {
    assert_eq!(infer_value("new Date()", true).ty, "Date");
    assert_eq!(infer_value("new Map()", true).ty, "Map<any, any>");
    assert_eq!(infer_value("new Map<string, number>()", true).ty, "Map<string, number>");
    assert_eq!(infer_value("new Thing()", true).ty, "Thing");
    assert_eq!(infer_value("new Array()", false).ty, "any[]");
}

#[test]
fn test_arrow_function_shapes() {
    assert_eq!(infer_value("(x: number) => x + 1", false).ty, "(x: number) => unknown");
    assert_eq!(
        infer_value("(x: number): string => x.toFixed()", false).ty,
        "(x: number) => string"
    );
    assert_eq!(infer_value("() => 'id'", false).ty, "() => string");
    assert_eq!(infer_value("() => { return 1 }", false).ty, "() => unknown");
}

#[test]
fn test_async_arrow_wraps_promise() {
    assert_eq!(infer_value("async () => 1", false).ty, "() => Promise<number>");
    assert_eq!(
        infer_value("async () => { return 1 }", false).ty,
        "() => Promise<unknown>"
    );
}

#[test]
fn test_single_ident_arrow() {
    assert_eq!(infer_value("x => x", false).ty, "(x) => unknown");
}

#[test]
fn test_generic_arrow_keeps_generics() {
    let t = infer_value("<T>(v: T) => v", false).ty;
    assert!(t.starts_with("<T>"), "generics lost: {t}");
}

#[test]
fn test_higher_order_arrow() {
    let t = infer_value("(a: number) => (b: number) => a + b", false).ty;
    assert_eq!(t, "(a: number) => (b: number) => unknown");
}

#[test]
fn test_collapse_on_angle_count() {
    let expr = "<A, B, C>(a: Map<A, B>, b: Map<B, C>, c: Map<A, C>, d: Map<C, A>, e: Map<B, A>) => a";
    assert_eq!(infer_value(expr, false).ty, "(...args: any[]) => any");
}

#[test]
fn test_collapse_on_length() {
    let long_body = "x".repeat(220);
    let expr = format!("() => '{long_body}'");
    assert_eq!(infer_value(&expr, false).ty, "(...args: any[]) => any");
}

#[test]
fn test_promise_combinators() {
    assert_eq!(infer_value("Promise.resolve(42)", false).ty, "Promise<number>");
    assert_eq!(infer_value("Promise.resolve()", false).ty, "Promise<void>");
    assert_eq!(infer_value("Promise.reject(new Error('x'))", false).ty, "Promise<never>");
    assert_eq!(
        infer_value("Promise.all([1, 'a'])", false).ty,
        "Promise<[number, string]>"
    );
}

#[test]
fn test_await_is_unknown() {
    assert_eq!(infer_value("await fetchThing()", false).ty, "unknown");
}

#[test]
fn test_unrecognized_is_unknown() {
    assert_eq!(infer_value("someCall(1, 2)", false).ty, "unknown");
    assert_eq!(infer_value("a ? b : c", false).ty, "unknown");
}

#[test]
fn test_nested_as_const_subtree() {
    let r = infer_value("{ mode: 'dev' as const }", false);
    assert!(r.ty.contains("mode: 'dev';"), "bad type: {}", r.ty);
    // as const subtrees are omitted from the clean default
    assert_eq!(r.clean.as_deref(), Some("{}"));
}

#[test]
fn test_deep_nesting_hits_depth_bound() {
    let mut expr = String::from("1");
    for _ in 0..20 {
        expr = format!("{{ v: {expr} }}");
    }
    let t = infer_value(&expr, false).ty;
    assert!(
        t.contains("Record<string, unknown>"),
        "depth bound missing: {t}"
    );
}

#[test]
fn test_generic_annotation_detection() {
    assert!(is_generic_annotation("any"));
    assert!(is_generic_annotation("Record<string, string>"));
    assert!(is_generic_annotation("{ [key: string]: string }"));
    assert!(!is_generic_annotation("HttpConfig"));
    assert!(!is_generic_annotation("{ port: number }"));
}

#[test]
fn test_strip_wrappers() {
    let (v, asserted) = strip_wrappers("[1, 2] as const");
    assert_eq!(v, "[1, 2]");
    assert!(asserted);

    let (v, asserted) = strip_wrappers("{ a: 1 } satisfies Config");
    assert_eq!(v, "{ a: 1 }");
    assert!(!asserted);

    // an identifier merely ending in "const" is untouched
    let (v, asserted) = strip_wrappers("superconst");
    assert_eq!(v, "superconst");
    assert!(!asserted);
}
