use std::rc::Rc;

use cinder::parser::{
    parse, parse_module, parse_script, print_program, source::Source, ParseOptions,
};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

/// Generate a program that exercises most of the grammar, repeated `num_copies` times with
/// distinct names so that no bindings conflict.
fn synthetic_program(num_copies: usize) -> String {
    let mut program = String::new();

    for i in 0..num_copies {
        program.push_str(&format!(
            r#"
const config{i} = {{ name: "item{i}", values: [1, 2.5, 0x1F, 1_000n], nested: {{ ok: true }} }};

function sum{i}(a, b = 1, ...rest) {{
  let total = a + b * 2 ** 3;
  for (const value of rest) {{
    total += value ?? 0;
  }}
  return total > 10 ? total : -total;
}}

class Shape{i} extends Object {{
  #sides = {i};
  static count = 0;

  constructor(name) {{
    super();
    this.name = name;
  }}

  get sides() {{
    return this.#sides;
  }}

  async *points(n) {{
    for (let j = 0; j < n; j++) {{
      yield await Promise.resolve([j, j * 2]);
    }}
  }}
}}

const handler{i} = async ({{ id, tags: [first, ...others] }}) => {{
  const result = await fetch(`/items/${{id}}?tag=${{first}}`);
  return result?.body?.[0] || others.map((x) => x.toUpperCase());
}};

label{i}: while (sum{i}(1, 2) < 100) {{
  if (/ab+c/gi.test(config{i}.name)) break label{i};
  switch (typeof handler{i}) {{
    case "function":
      continue label{i};
    default:
      throw new Error("unreachable");
  }}
}}
"#
        ));
    }

    program
}

fn setup_step(contents: &str) -> Rc<Source> {
    Rc::new(Source::new_from_string("synthetic.js", contents.to_owned()))
}

fn parser_benches(c: &mut Criterion) {
    let contents = synthetic_program(100);

    c.bench_function("synthetic > parse script", |b| {
        b.iter_batched(
            || setup_step(&contents),
            |source| parse_script(&source).unwrap(),
            BatchSize::PerIteration,
        )
    });

    c.bench_function("synthetic > parse module", |b| {
        b.iter_batched(
            || setup_step(&contents),
            |source| parse_module(&source).unwrap(),
            BatchSize::PerIteration,
        )
    });

    // Isolate printing phase
    c.bench_function("synthetic > print", |b| {
        b.iter_batched(
            || {
                let source = setup_step(&contents);
                let options = ParseOptions { ranges: true, loc: true, ..ParseOptions::default() };
                let print_options = options.print_options();
                let program = parse(&source, options).unwrap();
                (source, program, print_options)
            },
            |(source, program, options)| print_program(&program, &source, options),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(parser, parser_benches);
criterion_main!(parser);
