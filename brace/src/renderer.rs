use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::parsing::lexer::{Tag, Tags};
use crate::parsing::{scan_block, split_else, Block, BlockKind};
use crate::scope::Scope;
use crate::template::{Partials, Template};
use crate::utils::Span;
use crate::Context;

/// Default template name used for one-off renders of a raw string.
pub(crate) const ONE_OFF_TEMPLATE_NAME: &str = "__brace_one_off";

/// The output of a render and everything worth reporting about it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rendered {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Rendered {
    /// Whether the render went through without any diagnostic
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_output(self) -> String {
        self.output
    }
}

/// Renders `template` with `context`, including partials from `partials`.
///
/// Rendering never fails: missing data renders as nothing and problems with the
/// template itself come back as diagnostics next to the output.
///
/// ```
/// # use brace::{context, render, Partials};
/// let partials: Partials = vec![("greeting", "Hi {{name}}")].into_iter().collect();
/// let rendered = render("{{> greeting}}!", &context! { name => "Ann" }, &partials);
/// assert_eq!(rendered.output, "Hi Ann!");
/// ```
pub fn render(template: &str, context: &Context, partials: &Partials) -> Rendered {
    let template = Template::new(ONE_OFF_TEMPLATE_NAME, template);
    let globals = Context::new();
    Renderer::new(partials).render(&template, &Scope::root(context, &globals))
}

/// Walks a template and everything it includes.
/// Only collects diagnostics: the context and partials are never modified.
pub(crate) struct Renderer<'r> {
    partials: &'r Partials,
    diagnostics: Vec<Diagnostic>,
}

impl<'r> Renderer<'r> {
    pub(crate) fn new(partials: &'r Partials) -> Self {
        Self {
            partials,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn render(mut self, template: &Template, scope: &Scope<'_>) -> Rendered {
        let output = self.render_section(template, &template.source, 0, scope);
        Rendered {
            output,
            diagnostics: self.diagnostics,
        }
    }

    /// Renders `text`, a slice of `template`'s source starting at byte `offset`.
    /// The offset is only used to point diagnostics at the right place.
    fn render_section(
        &mut self,
        template: &Template,
        text: &str,
        offset: usize,
        scope: &Scope<'_>,
    ) -> String {
        let mut output = String::with_capacity(text.len());
        let mut tags = Tags::new(text);
        // Start of the text that hasn't been written yet
        let mut pending = 0;

        while let Some((start, tag, end)) = tags.next() {
            match tag {
                // A close tag outside of its block is just text
                Tag::Close(_) => continue,
                // Outside of an `if`, `else` is a path like any other
                Tag::Else => {
                    output.push_str(&text[pending..start]);
                    let _ = scope.get_from_path("else").format(&mut output);
                    pending = end;
                }
                Tag::Partial(name) => {
                    output.push_str(&text[pending..start]);
                    let span = offset + start..offset + end;
                    output.push_str(&self.render_partial(template, name, span, scope));
                    pending = end;
                }
                Tag::Variable(path) => {
                    output.push_str(&text[pending..start]);
                    // Writing to a String can't fail
                    let _ = scope.get_from_path(path).format(&mut output);
                    pending = end;
                }
                Tag::Open(kind, path) => {
                    output.push_str(&text[pending..start]);
                    let block = scan_block(&text[end..], kind);
                    self.check_block(template, &block, offset + start..offset + end);
                    output.push_str(&self.render_block(template, &block, path, offset + end, scope));
                    pending = text.len() - block.rest.len();
                    tags.seek(pending);
                }
            }
        }

        output.push_str(&text[pending..]);
        output
    }

    /// `body_offset` is where the block body starts in the template source
    fn render_block(
        &mut self,
        template: &Template,
        block: &Block<'_>,
        path: &str,
        body_offset: usize,
        scope: &Scope<'_>,
    ) -> String {
        let value = scope.get_from_path(path);

        match block.kind {
            BlockKind::Each => {
                let Some(items) = value.as_vec() else {
                    return String::new();
                };
                let mut output = String::new();
                for (index0, item) in items.iter().enumerate() {
                    let inner = scope.iteration(item, index0, items.len());
                    output.push_str(&self.render_section(template, block.body, body_offset, &inner));
                }
                output
            }
            BlockKind::If => {
                let (then, otherwise) = split_else(block.body);
                if value.is_truthy() {
                    self.render_section(template, then, body_offset, scope)
                } else if let Some(otherwise) = otherwise {
                    let else_offset = body_offset + block.body.len() - otherwise.len();
                    self.render_section(template, otherwise, else_offset, scope)
                } else {
                    String::new()
                }
            }
            BlockKind::Unless => {
                if value.is_truthy() {
                    String::new()
                } else {
                    self.render_section(template, block.body, body_offset, scope)
                }
            }
        }
    }

    /// Partials see exactly the same names as the tag including them
    fn render_partial(
        &mut self,
        template: &Template,
        name: &str,
        span: std::ops::Range<usize>,
        scope: &Scope<'_>,
    ) -> String {
        let partials = self.partials;
        match partials.get(name) {
            Some(partial) => self.render_section(partial, &partial.source, 0, scope),
            None => {
                self.report(template, DiagnosticKind::MissingPartial(name.to_string()), span);
                String::new()
            }
        }
    }

    fn check_block(&mut self, template: &Template, block: &Block<'_>, span: std::ops::Range<usize>) {
        match block.close {
            None => self.report(template, DiagnosticKind::UnclosedBlock(block.kind), span),
            Some(close) if block.is_mismatched() => self.report(
                template,
                DiagnosticKind::MismatchedClose {
                    open: block.kind,
                    close,
                },
                span,
            ),
            Some(_) => (),
        }
    }

    fn report(&mut self, template: &Template, kind: DiagnosticKind, span: std::ops::Range<usize>) {
        let span = Span::locate(&template.source, span);
        self.diagnostics
            .push(Diagnostic::new(kind, &template.name, &template.source, span));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_derive::Serialize;

    use super::*;
    use crate::{context, Value};

    #[derive(Serialize)]
    struct N {
        n: u32,
    }

    fn render_ok(tpl: &str, context: &Context) -> String {
        let rendered = render(tpl, context, &Partials::new());
        assert!(rendered.is_clean(), "{:?}", rendered.diagnostics);
        rendered.output
    }

    #[test]
    fn renders_literal_text_untouched() {
        let out = render_ok("<p class=\"x\">a { b } c}} &amp;</p>", &Context::new());
        assert_eq!(out, "<p class=\"x\">a { b } c}} &amp;</p>");
    }

    #[test]
    fn variables_resolve_dot_paths() {
        let ctx = context! { a => &BTreeMap::from([("b", "x")]) };
        assert_eq!(render_ok("{{a.b}}", &ctx), "x");
        assert_eq!(render_ok("{{a.c}}", &ctx), "");
        assert_eq!(render_ok("{{ a.b }}|{{missing.deep.path}}|", &ctx), "x||");
    }

    #[test]
    fn variables_are_not_escaped() {
        let ctx = context! { html => "<b>&</b>" };
        assert_eq!(render_ok("{{html}}", &ctx), "<b>&</b>");
    }

    #[test]
    fn null_renders_nothing() {
        let ctx = context! { nothing => &Option::<String>::None };
        assert_eq!(render_ok("[{{nothing}}]", &ctx), "[]");
    }

    #[test]
    fn each_binds_this_and_index() {
        let ctx = context! { xs => &vec![N { n: 5 }, N { n: 9 }] };
        let out = render_ok("{{#each xs}}{{@index}}:{{this.n}} {{/each}}", &ctx);
        assert_eq!(out, "0:5 1:9 ");
    }

    #[test]
    fn each_binds_first_and_last() {
        let ctx = context! { xs => &vec!["a", "b", "c"] };
        let out = render_ok(
            "{{#each xs}}{{#if @first}}[{{/if}}{{this}}{{#unless @last}},{{/unless}}{{#if @last}}]{{/if}}{{/each}}",
            &ctx,
        );
        assert_eq!(out, "[a,b,c]");
        let out = render_ok("{{#each xs}}{{@first}}/{{@last}} {{/each}}", &ctx);
        assert_eq!(out, "true/false false/false false/true ");
    }

    #[test]
    fn each_keeps_outer_names_visible() {
        let ctx = context! { xs => &vec![1, 2], sep => "-" };
        assert_eq!(render_ok("{{#each xs}}{{this}}{{sep}}{{/each}}", &ctx), "1-2-");
    }

    #[test]
    fn each_on_non_array_renders_nothing() {
        let ctx = context! { s => "abc", m => &BTreeMap::from([("a", 1)]), n => &3 };
        for name in ["s", "m", "n", "missing"] {
            let tpl = format!("<{{{{#each {name}}}}}x{{{{/each}}}}>");
            assert_eq!(render_ok(&tpl, &ctx), "<>");
        }
    }

    #[test]
    fn nested_each_shadows_this() {
        let ctx = context! { rows => &vec![vec![1, 2], vec![3]] };
        let out = render_ok(
            "{{#each rows}}{{@index}}({{#each this}}{{@index}}={{this}};{{/each}}){{/each}}",
            &ctx,
        );
        assert_eq!(out, "0(0=1;1=2;)1(0=3;)");
    }

    #[test]
    fn if_else_picks_a_branch() {
        let tpl = "{{#if flag}}Y{{else}}N{{/if}}";
        assert_eq!(render_ok(tpl, &context! { flag => &false }), "N");
        assert_eq!(render_ok(tpl, &context! { flag => &true }), "Y");
        assert_eq!(render_ok("{{#if flag}}Y{{/if}}", &context! { flag => &false }), "");
    }

    #[test]
    fn unless_negates() {
        let tpl = "{{#unless flag}}Z{{/unless}}";
        assert_eq!(render_ok(tpl, &context! { flag => &true }), "");
        assert_eq!(render_ok(tpl, &context! { flag => &false }), "Z");
        assert_eq!(render_ok(tpl, &Context::new()), "Z");
    }

    #[test]
    fn truthiness_table() {
        let tpl = "{{#if v}}A{{/if}}";
        let falsy = vec![
            Value::from(0),
            Value::from(""),
            Value::Null,
            Value::Undefined,
            Value::from(Vec::<Value>::new()),
            Value::from(false),
        ];
        for v in falsy {
            let mut ctx = Context::new();
            ctx.insert_value("v", v.clone());
            assert_eq!(render_ok(tpl, &ctx), "", "{v:?}");
        }

        let truthy = vec![
            Value::from(1),
            Value::from("s"),
            Value::from(vec![1]),
            Value::from(true),
            Value::from(BTreeMap::from([("k", 1)])),
        ];
        for v in truthy {
            let mut ctx = Context::new();
            ctx.insert_value("v", v.clone());
            assert_eq!(render_ok(tpl, &ctx), "A", "{v:?}");
        }
    }

    #[test]
    fn else_split_only_happens_at_the_top_level() {
        let tpl = "{{#if outer}}O{{#each xs}}[{{#if this.on}}on{{/if}}]{{/each}}{{else}}E{{/if}}";
        let ctx = context! { outer => &true, xs => &vec![BTreeMap::from([("on", true)]), BTreeMap::from([("on", false)])] };
        assert_eq!(render_ok(tpl, &ctx), "O[on][]");
        let ctx = context! { outer => &false, xs => &Vec::<u8>::new() };
        assert_eq!(render_ok(tpl, &ctx), "E");
    }

    #[test]
    fn nested_else_belongs_to_the_nested_if() {
        let tpl = "{{#if a}}{{#if b}}ab{{else}}a{{/if}}{{else}}none{{/if}}";
        assert_eq!(render_ok(tpl, &context! { a => &true, b => &true }), "ab");
        assert_eq!(render_ok(tpl, &context! { a => &true, b => &false }), "a");
        assert_eq!(render_ok(tpl, &context! { a => &false, b => &true }), "none");
    }

    #[test]
    fn partials_inherit_the_context() {
        let partials: Partials = vec![("header", "<h1>{{site.name}}</h1>")].into_iter().collect();
        let ctx = context! { site => &BTreeMap::from([("name", "Conf")]) };
        let rendered = render("{{> header}}body", &ctx, &partials);
        assert_eq!(rendered.output, "<h1>Conf</h1>body");
        assert!(rendered.is_clean());
    }

    #[test]
    fn partials_see_loop_variables() {
        let partials: Partials = vec![("item", "{{@index}}={{this}}")].into_iter().collect();
        let ctx = context! { xs => &vec!["a", "b"] };
        let rendered = render("{{#each xs}}{{>item}};{{/each}}", &ctx, &partials);
        assert_eq!(rendered.output, "0=a;1=b;");
    }

    #[test]
    fn partials_can_include_partials() {
        let partials: Partials = vec![("outer", "[{{> inner}}]"), ("inner", "{{x}}")]
            .into_iter()
            .collect();
        let rendered = render("{{> outer}}", &context! { x => &1 }, &partials);
        assert_eq!(rendered.output, "[1]");
    }

    #[test]
    fn missing_partial_is_reported_and_renders_nothing() {
        let rendered = render("a\n{{> nope}}b", &Context::new(), &Partials::new());
        assert_eq!(rendered.output, "a\nb");
        assert_eq!(rendered.diagnostics.len(), 1);
        let diag = &rendered.diagnostics[0];
        assert_eq!(diag.kind, DiagnosticKind::MissingPartial("nope".to_string()));
        assert_eq!(diag.template, ONE_OFF_TEMPLATE_NAME);
        assert_eq!(diag.span.start_line, 2);
        assert_eq!(diag.span.start_col, 0);
    }

    #[test]
    fn missing_partial_inside_partial_points_at_the_partial() {
        let partials: Partials = vec![("layout", "x {{> footer}}")].into_iter().collect();
        let rendered = render("{{> layout}}", &Context::new(), &partials);
        assert_eq!(rendered.output, "x ");
        assert_eq!(rendered.diagnostics[0].template, "layout");
        assert_eq!(rendered.diagnostics[0].span.range, 2..14);
    }

    #[test]
    fn unclosed_block_renders_until_the_end() {
        let rendered = render("a{{#if x}}b{{y}}", &context! { x => &true, y => &1 }, &Partials::new());
        assert_eq!(rendered.output, "ab1");
        assert_eq!(
            rendered.diagnostics[0].kind,
            DiagnosticKind::UnclosedBlock(BlockKind::If)
        );
        assert_eq!(rendered.diagnostics[0].span.range, 1..10);

        let rendered = render("a{{#if x}}b", &Context::new(), &Partials::new());
        assert_eq!(rendered.output, "a");
    }

    #[test]
    fn mismatched_close_still_closes_the_block() {
        let rendered = render("{{#if x}}y{{/each}}z", &context! { x => &true }, &Partials::new());
        assert_eq!(rendered.output, "yz");
        assert_eq!(
            rendered.diagnostics[0].kind,
            DiagnosticKind::MismatchedClose {
                open: BlockKind::If,
                close: BlockKind::Each
            }
        );
    }

    #[test]
    fn diagnostics_in_else_branch_point_at_the_right_place() {
        let tpl = "{{#if x}}a{{else}}{{> gone}}{{/if}}";
        let rendered = render(tpl, &Context::new(), &Partials::new());
        assert_eq!(rendered.diagnostics[0].span.range, 18..28);
    }

    #[test]
    fn unrecognised_tags_are_text() {
        let ctx = context! { a => &1 };
        assert_eq!(render_ok("{{ a + 1 }}", &ctx), "{{ a + 1 }}");
        assert_eq!(render_ok("{{{a}}}", &ctx), "{{{a}}}");
        assert_eq!(render_ok("{{", &ctx), "{{");
        assert_eq!(render_ok("{{/if}} {{a}}", &ctx), "{{/if}} 1");
        assert_eq!(render_ok("{{#for x}}{{a}}", &ctx), "{{#for x}}1");
    }

    #[test]
    fn else_outside_of_if_is_a_variable() {
        let tpl = "{{#unless flag}}A{{else}}B{{/unless}}|{{else}}";
        assert_eq!(render_ok(tpl, &context! { flag => &false }), "AB|");
        assert_eq!(render_ok(tpl, &context! { flag => &true }), "|");
        let mut ctx = context! { flag => &false };
        ctx.insert("else", "E");
        assert_eq!(render_ok(tpl, &ctx), "AEB|E");
        let ctx = context! { xs => &vec![1, 2] };
        assert_eq!(render_ok("{{#each xs}}{{this}}{{ else }}{{/each}}", &ctx), "12");
    }

    #[test]
    fn rendering_is_idempotent() {
        let partials: Partials = vec![("p", "{{#each xs}}{{this}}{{/each}}{{> missing}}")]
            .into_iter()
            .collect();
        let ctx = context! { xs => &vec![1, 2, 3] };
        let first = render("{{> p}}{{#if xs}}yes{{/if}}", &ctx, &partials);
        let second = render("{{> p}}{{#if xs}}yes{{/if}}", &ctx, &partials);
        assert_eq!(first, second);
        assert_eq!(first.output, "123yes");
    }

    #[test]
    fn can_render_a_page() {
        let partials: Partials = vec![(
            "nav",
            r#"<nav>{{#each nav}}<a href="{{this.href}}"{{#if this.current}} class="active"{{/if}}>{{this.title}}</a>{{/each}}</nav>"#,
        )]
        .into_iter()
        .collect();

        #[derive(Serialize)]
        struct Link {
            href: &'static str,
            title: &'static str,
            current: bool,
        }

        let ctx = context! {
            nav => &vec![
                Link { href: "/", title: "Home", current: true },
                Link { href: "/schedule.html", title: "Schedule", current: false },
            ],
            page_index => &true,
        };
        let tpl = "{{> nav}}\n{{#if page_index}}<main>welcome</main>{{else}}<main>other</main>{{/if}}";
        let rendered = render(tpl, &ctx, &partials);

        insta::assert_snapshot!(rendered.output, @r#"
        <nav><a href="/" class="active">Home</a><a href="/schedule.html">Schedule</a></nav>
        <main>welcome</main>
        "#);
    }
}
