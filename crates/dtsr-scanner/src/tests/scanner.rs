use super::*;

fn scan(source: &str) -> ScanOutput {
    Scanner::new(source, false, false).scan()
}

fn scan_keep(source: &str) -> ScanOutput {
    Scanner::new(source, true, false).scan()
}

#[test]
fn test_exported_const_literal() {
    let out = scan("export const port = 3000");
    assert_eq!(out.declarations.len(), 1);
    let d = &out.declarations[0];
    assert_eq!(d.kind, DeclarationKind::Variable);
    assert_eq!(d.name, "port");
    assert_eq!(d.text, "export declare const port: 3000;");
    assert!(d.is_exported());
}

#[test]
fn test_let_widens() {
    let out = scan("let retries = 3;");
    assert_eq!(out.declarations[0].text, "declare let retries: number;");
}

#[test]
fn test_variable_with_annotation_is_kept() {
    let out = scan("export const url: string = compute()");
    assert_eq!(out.declarations[0].text, "export declare const url: string;");
}

#[test]
fn test_generic_annotation_replaced_by_inference() {
    let src = "export const conf: { [key: string]: string } = { apiUrl: 'https://x', timeout: '5000' }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(text.contains("apiUrl: 'https://x'"), "literal lost: {text}");
    assert!(text.contains("timeout: '5000'"), "literal lost: {text}");
    assert!(!text.contains("[key: string]"), "annotation kept: {text}");
}

#[test]
fn test_destructuring_statement_is_skipped() {
    let out = scan("const { a, b } = require('mod');\nexport const x = 1;");
    assert_eq!(out.declarations.len(), 1);
    assert_eq!(out.declarations[0].name, "x");
}

#[test]
fn test_multi_declarator_keeps_first_binding() {
    let out = scan("const a = 1, b = 2;\nexport const c = 3;");
    let names: Vec<&str> = out.declarations.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_function_signature() {
    let out = scan("export function greet(name: string): string { return name }");
    assert_eq!(
        out.declarations[0].text,
        "export declare function greet(name: string): string;"
    );
}

#[test]
fn test_function_default_return_types() {
    let out = scan(
        "function a() {}\nasync function b() {}\nfunction* c() {}\nasync function* d() {}",
    );
    let texts: Vec<&str> = out.declarations.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts[0], "declare function a(): void;");
    assert_eq!(texts[1], "declare function b(): Promise<void>;");
    assert_eq!(texts[2], "declare function c(): Generator<unknown, void, unknown>;");
    assert_eq!(texts[3], "declare function d(): AsyncGenerator<unknown, void, unknown>;");
}

#[test]
fn test_overload_implementation_removed() {
    let src = "export function p(x: string): string\nexport function p(x: number): number\nexport function p(x: any): any { return x }";
    let out = scan(src);
    let texts: Vec<&str> = out.declarations.iter().map(|d| d.text.as_str()).collect();
    assert_eq!(texts.len(), 2, "implementation kept: {texts:?}");
    assert!(texts[0].contains("(x: string): string"));
    assert!(texts[1].contains("(x: number): number"));
}

#[test]
fn test_single_function_with_body_is_kept() {
    let out = scan("function only(x: number): number { return x }");
    assert_eq!(out.declarations.len(), 1);
}

#[test]
fn test_interface_export_and_cleaning() {
    let out = scan("export interface Point {\n  x: number // horizontal\n  y: number,\n}");
    let text = &out.declarations[0].text;
    assert!(text.starts_with("export interface Point {"), "envelope: {text}");
    assert!(text.contains("x: number;"), "member: {text}");
    assert!(text.contains("y: number;"), "member: {text}");
    assert!(!text.contains("//"), "comment leaked: {text}");
}

#[test]
fn test_non_exported_interface_is_held_back() {
    let out = scan("interface Hidden { x: number }\nexport const y = 1;");
    assert_eq!(out.declarations.len(), 1);
    assert_eq!(out.hoisted_interfaces.len(), 1);
    assert_eq!(out.hoisted_interfaces[0].name, "Hidden");
}

#[test]
fn test_type_alias_with_asi_union() {
    let out = scan("export type ID = string |\n  number\nexport const x = 1");
    assert_eq!(out.declarations[0].text, "export type ID = string |\n  number;");
    assert_eq!(out.declarations.len(), 2);
}

#[test]
fn test_enum_body_preserved() {
    let out = scan("export enum Color { Red = 'red', Green = 'green' }");
    assert_eq!(
        out.declarations[0].text,
        "export declare enum Color { Red = 'red', Green = 'green' }"
    );
}

#[test]
fn test_const_enum() {
    let out = scan("const enum Flags { A = 1 }");
    assert_eq!(out.declarations[0].text, "declare const enum Flags { A = 1 }");
}

#[test]
fn test_class_members_filtered_and_lifted() {
    let src = "export class Service { private key: string; public url: string; constructor(url: string, key: string) { this.url = url; this.key = key } }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(text.starts_with("export declare class Service {"), "envelope: {text}");
    assert!(text.contains("url: string;"), "public member lost: {text}");
    assert!(
        text.contains("constructor(url: string, key: string);"),
        "constructor: {text}"
    );
    assert!(
        !text.lines().any(|l| l.trim() == "key: string;"),
        "private member leaked: {text}"
    );
}

#[test]
fn test_constructor_parameter_properties() {
    let src = "class Box { constructor(public width: number, private secret: string, readonly tag: string) {} }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(text.contains("width: number;"), "lifted public: {text}");
    assert!(text.contains("readonly tag: string;"), "lifted readonly: {text}");
    assert!(!text.contains("secret"), "private param property leaked: {text}");
    assert!(
        text.contains("constructor(width: number, secret: string, tag: string);"),
        "ctor signature: {text}"
    );
}

#[test]
fn test_class_accessors() {
    let src = "class C { get value(): number { return 1 } set value(v: number) {} }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(text.contains("get value(): number;"), "getter: {text}");
    assert!(text.contains("set value(v: number): void;"), "setter: {text}");
}

#[test]
fn test_class_hash_fields_and_static_blocks_skipped() {
    let src = "class C { #secret = 1; static { init() } name: string = 'x' }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(!text.contains("#secret"), "hash field leaked: {text}");
    assert!(!text.contains("init"), "static block leaked: {text}");
    assert!(text.contains("name: string;"), "property lost: {text}");
}

#[test]
fn test_static_readonly_property_keeps_literal() {
    let out = scan("class C { static readonly VERSION = '1.0' }");
    let text = &out.declarations[0].text;
    assert!(
        text.contains("static readonly VERSION: '1.0';"),
        "literal lost: {text}"
    );
}

#[test]
fn test_instance_property_widens() {
    let out = scan("class C { count = 0 }");
    assert!(out.declarations[0].text.contains("count: number;"));
}

#[test]
fn test_abstract_class_and_methods() {
    let src = "export abstract class Base<T> { abstract run(input: T): T; }";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(
        text.starts_with("export declare abstract class Base<T> {"),
        "envelope: {text}"
    );
    assert!(text.contains("abstract run(input: T): T;"), "member: {text}");
}

#[test]
fn test_class_heritage() {
    let out = scan("class Dog extends Animal implements Pet, Named {}");
    let d = &out.declarations[0];
    assert_eq!(d.extends.as_deref(), Some("Animal"));
    assert_eq!(d.implements.as_deref(), Some("Pet, Named"));
    assert!(d.text.contains("extends Animal implements Pet, Named"));
}

#[test]
fn test_import_forms() {
    let src = "import './side-effect';\nimport type { T } from './types';\nimport React, { useState } from 'react';\nimport * as path from 'path';";
    let out = scan(src);
    assert_eq!(out.declarations.len(), 4);
    assert!(out.declarations[0].is_side_effect());
    assert_eq!(out.declarations[0].source.as_deref(), Some("./side-effect"));
    assert!(out.declarations[1].is_type_only());
    assert_eq!(out.declarations[2].source.as_deref(), Some("react"));
    assert_eq!(out.declarations[3].source.as_deref(), Some("path"));
}

#[test]
fn test_export_clauses() {
    let src = "export { a, b };\nexport type { T };\nexport * from 'mod';\nexport default config;";
    let out = scan(src);
    assert_eq!(out.declarations.len(), 4);
    assert_eq!(out.declarations[0].kind, DeclarationKind::Export);
    assert!(out.declarations[1].is_type_only());
    assert_eq!(out.declarations[2].source.as_deref(), Some("mod"));
    let default = &out.declarations[3];
    assert!(default.is_default());
    assert_eq!(default.text, "export default config;");
}

#[test]
fn test_export_default_function() {
    let out = scan("export default function main(): void {}");
    let d = &out.declarations[0];
    assert_eq!(d.name, "default");
    assert_eq!(d.text, "export default function main(): void;");
}

#[test]
fn test_namespace_body_reshaped() {
    let src = "namespace Api {\n  export const version = '1.0'\n  export function get(url: string): string { return url }\n}";
    let out = scan(src);
    let text = &out.declarations[0].text;
    assert!(text.starts_with("declare namespace Api {"), "envelope: {text}");
    assert!(
        text.contains("\n  export const version: '1.0';"),
        "inner variable: {text}"
    );
    assert!(
        text.contains("\n  export function get(url: string): string;"),
        "inner function: {text}"
    );
}

#[test]
fn test_dotted_namespace_name() {
    let out = scan("namespace A.B.C { export const x = 1 }");
    assert_eq!(out.declarations[0].name, "A.B.C");
}

#[test]
fn test_ambient_module() {
    let out = scan("declare module 'fs-extra' {\n  export function copy(src: string): void\n}");
    let d = &out.declarations[0];
    assert_eq!(d.kind, DeclarationKind::Module);
    assert_eq!(d.name, "'fs-extra'");
    assert_eq!(d.source.as_deref(), Some("fs-extra"));
    assert!(d.text.starts_with("declare module 'fs-extra' {"));
}

#[test]
fn test_declare_global() {
    let out = scan("declare global {\n  interface Window { custom: string }\n}");
    let d = &out.declarations[0];
    assert_eq!(d.name, "global");
    assert!(d.text.starts_with("declare global {"));
    assert!(d.text.contains("interface Window"));
}

#[test]
fn test_declare_is_transparent() {
    let out = scan("declare const VERSION: string;");
    assert_eq!(out.declarations[0].text, "declare const VERSION: string;");
}

#[test]
fn test_unknown_statements_skipped() {
    let src = "'use strict';\nconsole.log('hi');\nif (x) { doThing() }\nexport const ok = true;";
    let out = scan(src);
    assert_eq!(out.declarations.len(), 1);
    assert_eq!(out.declarations[0].name, "ok");
}

#[test]
fn test_comments_attached_when_kept() {
    let out = scan_keep("/** The port. */\nexport const port = 3000");
    let d = &out.declarations[0];
    assert_eq!(d.leading_comments, vec!["/** The port. */".to_string()]);
    assert!(d.render().starts_with("/** The port. */\n"));
}

#[test]
fn test_comments_dropped_by_default() {
    let out = scan("/** The port. */\nexport const port = 3000");
    assert!(out.declarations[0].leading_comments.is_empty());
}

#[test]
fn test_default_value_jsdoc_generated() {
    let out = scan_keep("export let config = { retries: 3 }");
    let d = &out.declarations[0];
    assert_eq!(d.leading_comments.len(), 1);
    assert!(
        d.leading_comments[0].contains("@defaultValue { retries: 3 }"),
        "payload missing: {:?}",
        d.leading_comments
    );
    assert!(d.text.contains("retries: number;"), "type: {}", d.text);
}

#[test]
fn test_default_value_not_duplicated() {
    let out = scan_keep("/** @defaultValue { retries: 3 } */\nexport let config = { retries: 3 }");
    let d = &out.declarations[0];
    assert_eq!(d.leading_comments.len(), 1, "tag duplicated: {:?}", d.leading_comments);
}

#[test]
fn test_as_const_tuple() {
    let out = scan("export let sizes = [1, 2, 3] as const");
    assert_eq!(
        out.declarations[0].text,
        "export declare let sizes: readonly [1, 2, 3];"
    );
}

#[test]
fn test_satisfies_is_stripped() {
    let out = scan("export const mode = 'dev' satisfies string");
    assert_eq!(out.declarations[0].text, "export declare const mode: 'dev';");
}

#[test]
fn test_isolated_declarations_skips_initializer() {
    let out = Scanner::new("export const x: number = compute()", false, true).scan();
    let d = &out.declarations[0];
    assert_eq!(d.text, "export declare const x: number;");
    assert!(d.value.is_none());
}

#[test]
fn test_scan_is_deterministic() {
    let src = "export const a = 1;\nexport function f(): void {}\n";
    let first = scan(src)
        .declarations
        .iter()
        .map(|d| d.text.clone())
        .collect::<Vec<_>>();
    let second = scan(src)
        .declarations
        .iter()
        .map(|d| d.text.clone())
        .collect::<Vec<_>>();
    assert_eq!(first, second);
}
