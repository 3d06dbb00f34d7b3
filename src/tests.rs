use crate::ast::Node;
use crate::compile::compile;
use crate::equal::{equal, equal_decl_str, equal_expr_str, equal_stmt_str};
use crate::parse::{decl_or_bad, expr_or_bad, stmt_or_bad};
use crate::pattern::Pattern;

// utils {{{
/// malformed fragments become `Bad` sentinels, which equal nothing
const MALFORMED: &[&str] = &["------", "?!", "$#", "x===y", "@a"];

fn check_equal(
    x: &str,
    y: &str,
    want: bool,
    by_str: fn(&str, &str) -> bool,
    by_node: fn(&str, &str) -> bool,
) {
    assert_eq!(want, by_str(x, y), "by string:\nx: {x:?}\ny: {y:?}");
    assert_eq!(want, by_node(x, y), "by node:\nx: {x:?}\ny: {y:?}");
}

fn exprs_by_node(x: &str, y: &str) -> bool {
    equal(Some((&expr_or_bad(x)).into()), Some((&expr_or_bad(y)).into()))
}

fn stmts_by_node(x: &str, y: &str) -> bool {
    equal(Some((&stmt_or_bad(x)).into()), Some((&stmt_or_bad(y)).into()))
}

fn decls_by_node(x: &str, y: &str) -> bool {
    equal(Some((&decl_or_bad(x)).into()), Some((&decl_or_bad(y)).into()))
}

fn pattern(template: &str) -> Pattern {
    compile(template).unwrap_or_else(|e| panic!("compile({template:?}): {e}"))
}

fn accept<'a>(template: &str, input: &str, node: impl Into<Node<'a>>) {
    assert!(pattern(template).matches(node), "{template:?} should accept {input:?}");
}

fn reject<'a>(template: &str, input: &str, node: impl Into<Node<'a>>) {
    assert!(!pattern(template).matches(node), "{template:?} should reject {input:?}");
}
// }}}

// expression equality {{{
const SAME_EXPRS: &[&str] = &[
    "x",
    "foo",
    "1",
    "250",
    "1.2",
    "250.8900",
    "1+2i",
    "0i",
    "0.i",
    ".12345E+5i",
    "'a'",
    r"'\''",
    "'本'",
    r"'\377'",
    r"'\U00100230'",
    "func(){}",
    "func(x int){}",
    "func(x, y int){}",
    "func(x, y int)float32{}",
    "func(x, y int) float32 {println(1)}",
    "func(x int, y string) (int, rune) {return 0, '0'}",
    "Foo{}",
    "Foo{x:1}",
    "Foo{1,2}",
    "struct{}{}",
    "struct{x int}{1}",
    "struct{x, y int}{1, 2}",
    "(1)",
    "((1))",
    "(((a)))",
    "a.b",
    "a.b.c",
    "foo().bar",
    "foo().bar()",
    "a[0]",
    "a[0][x]",
    "a[0][f()]",
    "a[0].x",
    "a[x:y]",
    "a[x:y:z]",
    "a[x:][:]",
    "a[:x][:]",
    "a[:][:]",
    "x.(int)",
    "x.(a).(*b)",
    "x.([]int)",
    "x.(*[2]interface{})",
    "int(x)",
    "(*int)(x)",
    "(uintptr)(unsafe.Pointer(y))",
    "f()",
    "f(1,2)",
    "f(1,xs...)",
    "f(g())",
    "*x",
    "**x",
    "+x",
    "-x",
    "x+y",
    "x-y",
    "x+y+z",
    "x+y-z",
    "[10][x]int",
    "[x+y]int",
    "[]int",
    "[][]int",
    "[...]int{1}",
    "struct{x int}",
    "struct{}",
    "struct{x int; y string}",
    "func()",
    "func(int)",
    "func(int)(int, int)",
    "func(int)(int, string)",
    "func(float32, float64)int",
    "interface{foo()}",
    "interface{foo(); bar(int)}",
    "interface{}",
    "map[A]B",
    "map[A]map[int]int",
    "map[A][]int",
    "chan int",
    "<- chan int",
    "chan <- int",
    "chan chan <- int",
];

const DIFFERENT_EXPRS: &[(&str, &str)] = &[
    ("x", "y"),
    ("foo", "y"),
    ("x", "(x)"),
    ("1", "2"),
    ("1", "777"),
    ("1", "(1)"),
    ("1", "1.0"),
    ("1.01", "1.00"),
    ("1.0", "(1.0)"),
    ("1+2i ", "1+3i"),
    ("0i", "1i"),
    ("0.i", "1.i"),
    (".12345E+5i", ".12245E+5i"),
    ("0i", "(0i)"),
    ("'a'", "'b'"),
    ("'a'", "'ä'"),
    (r"'\377'", r"'\370'"),
    (r"'\U00101234'", r"'\U00100230'"),
    ("'a'", "('a')"),
    ("func(){}", "func(y int){}"),
    ("func(x int){}", "func(y int){}"),
    ("func(x, y int){}", "func(x int, y int){}"),
    ("func(x, y int)float32{}", "func(x, y int)string{}"),
    ("func(x, y int) float32 {println(1)}", "func(x, y int) float32 {println(0)}"),
    (
        "func(x int, y string) (int, rune) {return 0, '0'}",
        "func(x int, y string) (int, int) {return 0, '0'}",
    ),
    ("func(){}", "(func(){})"),
    ("Foo{}", "Bar{}"),
    ("Foo{x:1}", "Foo{x:2}"),
    ("Foo{x:1}", "Foo{y:2}"),
    ("Foo{1,2}", "Foo{2,2}"),
    ("Foo{x:1}", "Foo{1}"),
    ("struct{}{}", "struct{x int}{}"),
    ("struct{x int}{1}", "struct{x int}{2}"),
    ("struct{x, y int}{1, 2}", "struct{x, z int}{1, 2}"),
    ("Foo{}", "(Foo{})"),
    ("(1)", "1"),
    ("((1))", "(1)"),
    ("(((a)))", "((a))"),
    ("a.b", "a.c"),
    ("a.b.c", "c.b.c"),
    ("foo().bar", "foo().baz"),
    ("foo().bar()", "foo().baz()"),
    ("a.b", "(a.b)"),
    ("a[0]", "b[0]"),
    ("a[0][x]", "a[0][y]"),
    ("a[0][f()]", "a[0][g()]"),
    ("a[0].x", "a[1].x"),
    ("a[0]", "(a[0])"),
    ("b[x:y]", "a[x:y]"),
    ("b[x:y:z]", "a[x:y:z]"),
    ("b[x:][:]", "a[x:][:]"),
    ("b[:x][:]", "a[:x][:]"),
    ("b[:][:]", "a[:][:]"),
    ("a[x:y]", "a[x:x]"),
    ("a[x:y:z]", "a[x:y:x]"),
    ("a[x:][:]", "a[x:][:1]"),
    ("a[:x][:]", "a[:x][1:]"),
    ("a[:][:]", "a[1:][:]"),
    ("a[x:y]", "(a[x:y])"),
    ("x.(int)", "x.(float)"),
    ("x.(int)", "y.(int)"),
    ("x.(a).(*b)", "x.(a).(b)"),
    ("x.([]int)", "x.([10]int)"),
    ("x.(*[2]interface{})", "x.(*[2]struct{})"),
    ("x.(int)", "(x.(int))"),
    ("int(x)", "float32(y)"),
    ("(*int)(x)", "(int)(x)"),
    ("(uintptr)(unsafe.Pointer(y))", "uintptr(unsafe.Pointer(y))"),
    ("(*int)(x)", "((*int)(x))"),
    ("f()", "g()"),
    ("f(1,2)", "f(1,3)"),
    ("f(1,xs...)", "f(1,xs)"),
    ("f(g())", "f(f())"),
    ("*x", "*y"),
    ("**x", "*x"),
    ("*x", "(*x)"),
    ("+x", "+y"),
    ("+x", "-x"),
    ("+x", "(+x)"),
    ("x+y", "0+y"),
    ("x-y", "x-0"),
    ("x+y+z", "x+y+0"),
    ("x+y-z", "x+y-0"),
    ("x+y", "(x+y)"),
    ("[10][x]int", "[10][y]int"),
    ("[x+y]int", "[x+y]float32"),
    ("[]int", "[][]int"),
    ("[][]int", "[]int"),
    ("[]int", "([]int)"),
    ("[...]int{1}", "[1]int{1}"),
    ("struct{x int}", "struct{y int}"),
    ("struct{}", "struct{x int}"),
    ("struct{x int; y string}", "struct{x float32; y string}"),
    ("struct{}", "(struct{})"),
    ("func()", "func(int)"),
    ("func(int)", "func(int,int)"),
    ("func(int)(int, int)", "func(int)(float32, int)"),
    ("func(int)(int, int)", "func(int)(int)"),
    ("func(float32, float64)int", "func(float64, float64)"),
    ("func()", "(func())"),
    ("interface{foo()}", "interface{bar()}"),
    ("interface{foo(); bar(int)}", "interface{foo(); bar(float32)}"),
    ("interface{}", "interface{foo(int)}"),
    ("interface{}", "(interface{})"),
    ("map[A]B", "map[A]int"),
    ("map[A]B", "map[int]B"),
    ("map[A]map[int]int", "map[A]map[int]float32"),
    ("map[A][]int", "map[A][2]int"),
    ("map[A][B]", "(map[A][B])"),
    ("chan int", "chan x"),
    ("chan <- int", "<- chan int"),
    ("chan <- x", "chan <- int"),
    ("chan chan <- int", "chan <- int"),
    ("chan int", "(chan int)"),
];

#[test]
fn equal_exprs() {
    for x in MALFORMED {
        check_equal(x, x, false, equal_expr_str, exprs_by_node);
    }
    for x in SAME_EXPRS {
        let y = format!("\n/**/{x}  \n//xyz\n");
        check_equal(x, &y, true, equal_expr_str, exprs_by_node);
    }
    for (x, y) in DIFFERENT_EXPRS {
        check_equal(x, y, false, equal_expr_str, exprs_by_node);
    }
}
// }}}

// statement equality {{{
const SAME_STMTS: &[&str] = &[
    ";",
    ";;",
    "f()",
    "x.y()",
    "<- x",
    "<- <- x",
    "x++",
    "x--",
    "x := y",
    "x = y",
    "x, y := 1, 2",
    "x, y = 1, 2",
    "x, y := f()",
    "x, y = f()",
    "go f()",
    "go func(){}()",
    "go f()(1)",
    "defer f()",
    "return",
    "return x",
    "return x, y",
    "switch x {case 0: f()}",
    "switch y := x; y {case 0: f()}",
    "switch {case x == 0: f()}",
    "switch {default: f()}",
    "switch {default: break}",
    "if true {f()}",
    "if x := y; x {f()}",
    "if x {f()} else {g()}",
    "if x {f()} else if y {g()} else {panic(0)}",
    "switch x := y.(type) {}",
    "switch x.(type) {}",
    "switch x := y.(type) {case int: f()}",
    "switch x.(type) {default: g()}",
    "select {}",
    "select {case x <- c: f(); case <-y: g()}",
    "for {}",
    "for true {}",
    "for ;; {}",
    "for i := 0; i < 10; i++ {}",
    "for i = 0; i < len(xs); i += 2 {}",
    "for i := range m {}",
    "for k, v := range m {}",
    "for _, v := range m {}",
    "for k, _ := range m {}",
    "for i = range m {}",
    "for k, v = range m {}",
    "goto x",
    "break x",
    "var x int",
    "var x = 10",
    "var (x int; y int)",
    "const x = 10",
    "l: for {}",
];

const DIFFERENT_STMTS: &[(&str, &str)] = &[
    ("{;}", "{}"),
    ("{f(), g()}", "{f()}"),
    ("f()", "g()"),
    ("x.y()", "x.z()"),
    ("f()", "{f()}"),
    ("<- x", "<- y"),
    ("<- <- x", "<- x"),
    ("<- x", "{<- x}"),
    ("x++", "y++"),
    ("x--", "x++"),
    ("x++", "{x++}"),
    ("x := y", "x := z"),
    ("x = y", "x := y"),
    ("x, y := 1, 2", "x, y = 2, 1"),
    ("x, y = 1, 2", "x = 1"),
    ("x, y := f()", "x, y := g()"),
    ("x, y = f()", "x := f()"),
    ("x := y", "{x := y}"),
    ("go f()", "go g()"),
    ("go func(){}()", "go func()int{}()"),
    ("go f()(1)", "go f(1)()"),
    ("go f()", "{go f()}"),
    ("defer f()", "defer g()"),
    ("defer f()", "{defer f()}"),
    ("return", "return x"),
    ("return x", "return y"),
    ("return x, y", "return x"),
    ("return x, y", "return y, x"),
    ("return x", "{return x}"),
    ("switch x {case 0: f()}", "switch y {case 0: f()}"),
    ("switch x {case 0: f()}", "switch x {case 1: f()}"),
    ("switch x {case 0: f()}", "switch x {case 0: g()}"),
    ("switch y := x; y {case 0: f()}", "switch y := z; y {case 0: f()}"),
    ("switch y := x; y {case 0: f()}", "switch z := x; z {case 0: f()}"),
    ("switch y := x; y {case 0: f()}", "switch y := x; y {case 1: f()}"),
    ("switch y := x; y {case 0: f()}", "switch y := x; y {case 0: g()}"),
    ("switch {case x == 0: f()}", "switch {case x == 1: f()}"),
    ("switch {case x == 0: f()}", "switch x {case 0: f()}"),
    ("switch {default: break}", "switch {default: f()}"),
    ("switch{}", "{switch{}}"),
    ("if true {f()}", "if false {f()}"),
    ("if true {f()}", "if true {g()}"),
    ("if x := y; x {f()}", "if x := z; x {f()}"),
    ("if x {f()} else {g()}", "if x {f()} else {f()}"),
    ("if x {f()} else {g()}", "if x {f()}"),
    (
        "if x {f()} else if y {g()} else {panic(0)}",
        "if x {f()} else if y {g()} else {panic(1)}",
    ),
    ("if true {f()}", "{if true {f()}}"),
    ("switch x := y.(type) {}", "switch x := z.(type) {}"),
    ("switch x.(type) {}", "switch y.(type) {}"),
    ("switch x.(type) {}", "{switch x.(type) {}}"),
    (
        "select {case x <- c: f(); case <-y: g()}",
        "select {case <-x: f(); case <-y: g()}",
    ),
    ("select {}", "{select {}}"),
    ("for true {}", "for false {}"),
    ("for ;; {}", "for ; i < 10; {}"),
    ("for ;; {}", "for true {}"),
    ("for i := 0; i < 10; i++ {}", "for i := 0; i < 10; j++ {}"),
    ("for i := 0; i < 10; i++ {}", "for i := 0; j < 10; i++ {}"),
    ("for i := 0; i < 10; i++ {}", "for j := 0; i < 10; i++ {}"),
    ("for i = 0; i < len(xs); i += 2 {}", "for i := 0; i < len(xs); i += 2 {}"),
    ("for {}", "{for {}}"),
    ("for i := range m {}", "for i := range mm {}"),
    ("for k, v := range m {}", "for _, v := range m {}"),
    ("for _, v := range m {}", "for k, _ := range m {}"),
    ("for k, _ := range m {}", "for _, _ := range m {}"),
    ("for i = range m {f()}", "for i := range m {g()}"),
    ("for k, v = range m {}", "for k, v := range m {}"),
    ("for i := range m {}", "{for i := range m{}}"),
    ("goto x", "{goto x}"),
    ("var x = 10", "var y = 10"),
    ("var x = f()", "var x, y = f()"),
    ("const x = 10", "var x = 10"),
    ("var x int", "{var x int}"),
    ("a: for{}", "b: for{}"),
];

#[test]
fn equal_stmts() {
    for x in MALFORMED {
        check_equal(x, x, false, equal_stmt_str, stmts_by_node);
        let x = format!("{{{x}}}");
        check_equal(&x, &x, false, equal_stmt_str, stmts_by_node);
    }
    for x in SAME_STMTS {
        let (x, y) = (format!("{{{x}}}"), format!("\n/**/{{{x} }} \n//xyz\n"));
        check_equal(&x, &y, true, equal_stmt_str, stmts_by_node);
    }
    for (x, y) in DIFFERENT_STMTS {
        let (x, y) = (format!("{{{x}}}"), format!("{{{y}}}"));
        check_equal(&x, &y, false, equal_stmt_str, stmts_by_node);
    }
}
// }}}

// declaration equality {{{
const SAME_DECLS: &[&str] = &[
    "import ()",
    "import \"a\"",
    "import (\"a\"; \"b\")",
    "import f \"fmt\"",
    "func f() {}",
    "func f(x, y int) int {return 0}",
    "func (Foo) f() {}",
    "func (x Foo) f() {}",
    "type x int",
    "type x = int",
    "type x struct{foo int}",
    "type x interface{foo()}",
];

const DIFFERENT_DECLS: &[(&str, &str)] = &[
    ("import \"a\"", "import \"b\""),
    ("import (\"a\"; \"b\")", "import (\"a\", \"a\")"),
    ("import (\"a\"; \"b\")", "import (\"a\")"),
    ("import ()", "func f() {}"),
    ("import f \"fmt\"", "import \"fmt\""),
    ("func f() {}", "func g() {}"),
    ("func f() {}", "func f() {return}"),
    ("func (Foo) f() {}", "func (x Foo) f() {}"),
    ("func (Foo) f() {}", "func (Bar) f() {}"),
    ("func (x Foo) f() {}", "func (y Foo) f() {}"),
    ("type x int", "type y int"),
    ("type x int", "type x float32"),
    ("type x int", "type x = int"),
    ("type x interface{foo()}", "type x interface{bar()}"),
    ("type x interface{}", "type x struct{}"),
];

#[test]
fn equal_decls() {
    for x in MALFORMED {
        check_equal(x, x, false, equal_decl_str, decls_by_node);
    }
    for x in SAME_DECLS {
        let y = format!("\n{x}\n");
        check_equal(x, &y, true, equal_decl_str, decls_by_node);
    }
    for (x, y) in DIFFERENT_DECLS {
        check_equal(x, y, false, equal_decl_str, decls_by_node);
    }
}

#[test]
fn equal_across_categories() {
    let x = expr_or_bad("f()");
    let s = stmt_or_bad("f()");
    let d = decl_or_bad("func f() {}");
    assert!(!equal(Some((&x).into()), Some((&s).into())));
    assert!(!equal(Some((&s).into()), Some((&d).into())));
    assert!(equal(None, None));
    assert!(!equal(Some((&d).into()), None));
}

#[test]
fn deep_nesting_is_bad() {
    let nested = |open: &str, close: &str, n: usize| {
        format!("{}x{}", open.repeat(n), close.repeat(n))
    };

    let shallow = nested("(", ")", 50);
    assert!(equal_expr_str(&shallow, &shallow));

    let deep = nested("(", ")", 500);
    assert!(!equal_expr_str(&deep, &deep));
    assert!(!equal_expr_str(&nested("f(", ")", 500), &nested("f(", ")", 500)));

    let blocks = format!("{}{}", "{".repeat(500), "}".repeat(500));
    assert!(!equal_stmt_str(&blocks, &blocks));

    assert!(!pattern("(call f $...)").matches(&expr_or_bad(&format!("f({deep})"))));
    assert!(compile(&nested("(deref ", ")", 500)).is_err());
}
// }}}

// matching {{{
const ACCEPT_EXPRS: &[(&str, &str)] = &[
    ("1", "1"),
    ("(1)", "1"),
    ("((1))", "1"),
    ("x", "x"),
    ("x", "$id"),
    ("1 + 2", "(+ 1 2)"),
    ("x + 1", "(+ x 1)"),
    ("x + y + z", "(+ (+ x y) z)"),
    ("x + (y + z)", "(+ x (+ y z))"),
    ("x + y * z", "(+ x (* y z))"),
    ("(x + y) * z", "(* (+ x y) z)"),
    ("-x", "(- x)"),
    ("!ok", "(! ok)"),
    ("<-ch", "(<- ch)"),
    ("&v", "(& v)"),
    ("*p", "(deref p)"),
    ("a &^ b", "(&^ a b)"),
    ("f(1)", "(call f 1)"),
    ("append(xs, 1)", "(call append xs 1)"),
    ("append(xs, a, b, 1)", "(call append xs $... 1)"),
    ("append(xs, 1)", "(call append xs $... 1)"),
    ("f(1)(2)", "(call (call f 1) 2)"),
    ("f()", "(call f $...)"),
    ("f(a, b)", "(call f $...)"),
    ("f(xs...)", "(call f xs)"),
    ("foo.bar", "(. foo bar)"),
    ("foo.bar", "(. $id $id)"),
    ("foo.bar.baz", "(. (. foo bar) baz)"),
    ("foo.bar()", "(call (. foo bar))"),
    ("foo.bar.baz(x)", "(call (. (. foo bar) baz) x)"),
    ("a.x + b.y + c.z", "(+ (+ (. a x) (. b y)) (. c z))"),
    ("f().x", "(. (call f) x)"),
    ("f().g().x", "(. (call (. (call f) g)) x)"),
    ("1 + 2.3", "(+ 1 $float)"),
    ("1 + 2.3", "(+ $int 2.3)"),
    ("1 + 2.3", "(+ $int $float)"),
    ("2i", "$imag"),
    ("\"a\" + \"b\"", "(+ \"a\" $str)"),
    ("\"a\" + \"b\"", "(+ $str \"b\")"),
    ("\"a\" + \"b\"", "(+ $str $str)"),
    ("ch - '0'", "(- ch $char)"),
    ("ch - '0'", "(- $id '0')"),
    ("ch - '0'", "(- $id $char)"),
    ("[5]int", "(array_type 5 int)"),
    ("[foo + 1][10]float32", "(array_type (+ foo 1) (array_type 10 float32))"),
    ("[]int", "(slice_type int)"),
    ("[][]int", "(slice_type (slice_type int))"),
    ("[][][]Point", "(slice_type (slice_type (slice_type Point)))"),
];

const REJECT_EXPRS: &[(&str, &str)] = &[
    ("f()", "(callstmt f)"),
    ("1 + f(x)", "(+ 1 (callstmt f x))"),
    ("x", "y"),
    ("1", "$float"),
    ("1.0", "$int"),
    ("1", "1.0"),
    ("'a'", "$str"),
    ("x", "$int"),
    ("1", "$id"),
    ("-x", "(- x y)"),
    ("x - y", "(+ x y)"),
    ("f(1, 2)", "(call f 1)"),
    ("f(1)", "(call f 1 2)"),
    ("f(1, 1)", "(call f $... 1 $... 1 1)"),
    ("foo.bar", "(. foo baz)"),
    ("*p", "(& p)"),
    ("[5]int", "(slice_type int)"),
    ("[]int", "(array_type 5 int)"),
];

const ACCEPT_STMTS: &[(&str, &str)] = &[
    ("{1; 2}", "(block 1 2)"),
    ("{f()}", "(block (call f))"),
    ("{f()}", "(block (callstmt f))"),
    ("{foo.bar}", "(block (. foo bar))"),
    ("f()", "(callstmt f)"),
    ("f()", "(call f)"),
    ("(f())", "(call f)"),
    ("{}", "(block)"),
    ("{}", "(block $...)"),
    ("{f(); g(); h()}", "(block $...)"),
    ("{1; 2}", "(block 1 $... 2)"),
    ("{1; x; 2}", "(block 1 $... 2)"),
    ("{1; x; y; 2}", "(block $... x $... 2)"),
    ("x++", "(++ x)"),
    ("x--", "(-- x)"),
    ("ch <- v", "(<- ch v)"),
    ("x = 1", "(= x $int)"),
    ("{x = f(); x++}", "(block (= x (call f)) (++ x))"),
];

const REJECT_STMTS: &[(&str, &str)] = &[
    ("{1}", "1"),
    ("{1}", "(block)"),
    ("{1; 2}", "(block 1)"),
    ("{1}", "(block 1 2)"),
    ("{1; 2}", "(block 2 $...)"),
    ("{1; 2; 3}", "(block $... 2)"),
    ("x++", "(-- x)"),
    ("x = 1", "(= y 1)"),
    ("ch <- v", "(<- ch)"),
];

#[test]
fn match_exprs() {
    for (input, template) in ACCEPT_EXPRS {
        accept(template, input, &expr_or_bad(input));
    }
    for (input, template) in REJECT_EXPRS {
        reject(template, input, &expr_or_bad(input));
    }
}

#[test]
fn match_stmts() {
    for (input, template) in ACCEPT_STMTS {
        accept(template, input, &stmt_or_bad(input));
    }
    for (input, template) in REJECT_STMTS {
        reject(template, input, &stmt_or_bad(input));
    }
}

#[test]
fn first_fit() {
    // either `1` could close the ellipsis, the first one does and the
    // remaining `1, x` no longer lines up with `x`
    reject("(block $... 1 x)", "{1; 1; x}", &stmt_or_bad("{1; 1; x}"));
    accept("(block $... 1 x)", "{0; 1; x}", &stmt_or_bad("{0; 1; x}"));
    reject("(call f $... 1)", "f(1, 1)", &expr_or_bad("f(1, 1)"));
    accept("(call f $... 1 2)", "f(0, 1, 2)", &expr_or_bad("f(0, 1, 2)"));
}

#[test]
fn bad_never_matches() {
    for template in ["$id", "(block $...)", "(call f $...)"] {
        let p = pattern(template);
        assert!(!p.matches(&expr_or_bad("$#")));
        assert!(!p.matches(&stmt_or_bad("$#")));
        assert!(!p.matches(&decl_or_bad("$#")));
    }
}

#[test]
fn patterns_are_reusable() {
    let p = pattern("(+ $id $int)");
    let inputs = ["x + 1", "y + 2", "z + 3.0", "x + 1"];
    let have: Vec<bool> = inputs.iter().map(|s| p.matches(&expr_or_bad(s))).collect();
    assert_eq!(vec![true, true, false, true], have);

    let shared = p.clone();
    let handle = std::thread::spawn(move || shared.matches(&expr_or_bad("q + 9")));
    assert!(matches!(handle.join(), Ok(true)));
}

#[test]
fn rendering_compiles_back() {
    for template in [
        "(call f $... $int $str $id)",
        "(block (callstmt (. fmt Println) \"hi\") (++ i))",
        "(array_type 10 (slice_type (deref T)))",
        "(= x (<- ch))",
    ] {
        let text = pattern(template).to_string();
        assert_eq!(template, text);
        assert_eq!(text, pattern(&text).to_string());
    }
}

#[cfg(not(feature = "strict-coverage"))]
#[test]
fn uncovered_kinds_do_not_match() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let p = pattern("$id");
    assert!(!p.matches(&expr_or_bad("x[0]")));
    assert!(!p.matches(&expr_or_bad("T{}")));
    assert!(!p.matches(&stmt_or_bad("return x")));
    assert!(!p.matches(&stmt_or_bad("x += 1")));
    assert!(!p.matches(&decl_or_bad("var x int")));
}

#[cfg(feature = "strict-coverage")]
#[test]
#[should_panic(expected = "no template form covers")]
fn uncovered_kinds_panic() {
    pattern("$id").matches(&expr_or_bad("x[0]"));
}
// }}}

// properties {{{
mod properties {
    use super::*;
    use crate::equal::equal_expr;
    use crate::lex::is_keyword;
    use crate::parse::parse_expr;
    use proptest::prelude::*;

    fn arb_ident() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,6}".prop_filter("not a keyword", |s| !is_keyword(s))
    }

    fn arb_expr() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            arb_ident(),
            (0u32..1000).prop_map(|n| n.to_string()),
            Just("1.5".to_string()),
            Just("'a'".to_string()),
            Just("\"s\"".to_string()),
        ];
        leaf.prop_recursive(3, 24, 3, |inner| {
            prop_oneof![
                (
                    inner.clone(),
                    prop::sample::select(vec!["+", "-", "*", "==", "&&", "<<"]),
                    inner.clone()
                )
                    .prop_map(|(x, op, y)| format!("{x} {op} {y}")),
                inner.clone().prop_map(|x| format!("({x})")),
                inner.clone().prop_map(|x| format!("^{x}")),
                (arb_ident(), prop::collection::vec(inner, 0..3))
                    .prop_map(|(f, args)| format!("{f}({})", args.join(", "))),
            ]
        })
    }

    fn arb_prefix() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["", " ", "\n", "/**/", "\n/* c */ "])
    }

    fn arb_suffix() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["", " ", "\n", "//xyz", "  \n//xyz\n", "/* c */"])
    }

    proptest! {
        #[test]
        fn prop_reflexive(source in arb_expr()) {
            let x = parse_expr(&source);
            prop_assert!(x.is_ok(), "{source:?} does not parse");
            if let Ok(x) = x {
                prop_assert!(equal_expr(&x, &x));
            }
            prop_assert!(equal_expr_str(&source, &source));
        }

        #[test]
        fn prop_layout_insensitive(source in arb_expr(), pre in arb_prefix(), post in arb_suffix()) {
            let decorated = format!("{pre}{source}{post}");
            prop_assert!(equal_expr_str(&source, &decorated));
        }

        #[test]
        fn prop_grouping_sensitive(source in arb_expr()) {
            let grouped = format!("({source})");
            prop_assert!(!equal_expr_str(&source, &grouped));
        }

        #[test]
        fn prop_ident_templates(name in arb_ident()) {
            let x = expr_or_bad(&name);
            prop_assert!(pattern(&name).matches(&x));
            prop_assert!(pattern("$id").matches(&x));
            prop_assert!(!pattern("$int").matches(&x));
        }
    }
}
// }}}
