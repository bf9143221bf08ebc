use dsbconvert_core::xml::{escape, escape_comment, fmt_num, Document, Element};

#[test]
fn serializer_layout_is_fixed() {
    let doc = Document {
        comment: Some("File generated by test".to_string()),
        root: Element::new("Root")
            .attr("b", "2")
            .attr("a", "1")
            .child(Element::new("Empty"))
            .child(Element::new("Values").text("1 2 3"))
            .child(Element::new("Outer").child(Element::new("Inner").attr("x", "0.5000"))),
    };
    let expected = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n",
        "<!--File generated by test-->\n",
        "<Root b=\"2\" a=\"1\">\n",
        "  <Empty />\n",
        "  <Values>1 2 3</Values>\n",
        "  <Outer>\n",
        "    <Inner x=\"0.5000\" />\n",
        "  </Outer>\n",
        "</Root>\n",
    );
    assert_eq!(expected, doc.to_xml());
    roxmltree::Document::parse(&doc.to_xml()).expect("well-formed");
}

#[test]
fn markup_characters_are_escaped() {
    assert_eq!("a &amp; b &lt;c&gt; &quot;d&quot; &apos;e&apos;", escape("a & b <c> \"d\" 'e'"));
    assert_eq!("line&#10;break", escape("line\nbreak"));
    assert_eq!("bell", escape("be\u{7}ll"));
}

#[test]
fn comments_never_contain_double_hyphens() {
    let cleaned = escape_comment("a -- b ---");
    assert!(!cleaned.contains("--"));
    assert!(!cleaned.ends_with('-'));

    let doc = Document {
        comment: Some("tool --version-".to_string()),
        root: Element::new("Root"),
    };
    let parsed = doc.to_xml();
    let parsed = roxmltree::Document::parse(&parsed).expect("well-formed");
    assert!(parsed.root().children().any(|n| n.is_comment()));
}

#[test]
fn numbers_have_fixed_precision_and_no_negative_zero() {
    assert_eq!("1.2500", fmt_num(1.25, 4));
    assert_eq!("0.0000", fmt_num(-0.0, 4));
    assert_eq!("0.0000", fmt_num(-0.00001, 4));
    assert_eq!("-0.0001", fmt_num(-0.0001, 4));
    assert_eq!("3", fmt_num(3.0, 0));
    assert_eq!("0.00", fmt_num(f64::NAN, 2));
}

#[test]
fn tree_queries_walk_breadth_first() {
    let root = Element::new("A")
        .child(Element::new("B").child(Element::new("D")))
        .child(Element::new("C").attr("k", "v"));
    let names: Vec<&str> = root.descendants().iter().map(|e| e.name).collect();
    assert_eq!(vec!["A", "B", "C", "D"], names);
    assert_eq!(Some("v"), root.elements().nth(1).and_then(|c| c.get_attr("k")));
}
