//! End-to-end emission scenarios.

use dtsr::process_source;

#[test]
fn test_exported_const_gets_literal_type() {
    let out = process_source("export const port = 3000", false, false);
    assert!(
        out.contains("export declare const port: 3000;"),
        "literal type missing: {out}"
    );
}

#[test]
fn test_generic_annotation_replaced_by_object_inference() {
    let src = "export const conf: { [key: string]: string } = { apiUrl: 'https://x', timeout: '5000' }";
    let out = process_source(src, false, false);
    assert!(out.contains("apiUrl: 'https://x'"), "literal lost: {out}");
    assert!(out.contains("timeout: '5000'"), "literal lost: {out}");
    assert!(!out.contains("[key: string]"), "index signature kept: {out}");
}

#[test]
fn test_function_body_stripped() {
    let out = process_source(
        "export function greet(name: string): string { return name }",
        false,
        false,
    );
    assert_eq!(out.trim(), "export declare function greet(name: string): string;");
}

#[test]
fn test_overloads_complete_and_implementation_dropped() {
    let src = "export function p(x: string): string\nexport function p(x: number): number\nexport function p(x: any): any { return x }";
    let out = process_source(src, false, false);
    assert!(
        out.contains("export declare function p(x: string): string;"),
        "overload 1 missing: {out}"
    );
    assert!(
        out.contains("export declare function p(x: number): number;"),
        "overload 2 missing: {out}"
    );
    assert!(!out.contains("(x: any): any"), "implementation leaked: {out}");
}

#[test]
fn test_directive_prologue_shape() {
    let src = "/// <reference types=\"node\" />\nexport const x = 1";
    let out = process_source(src, false, false);
    assert!(
        out.starts_with("/// <reference types=\"node\" />\n\n"),
        "prologue shape wrong: {out}"
    );
    assert!(out.contains("declare const x: 1;"), "declaration missing: {out}");
}

#[test]
fn test_class_private_members_filtered() {
    let src = "export class Service { private key: string; public url: string; constructor(url: string, key: string) { this.url = url; this.key = key } }";
    let out = process_source(src, false, false);
    assert!(out.contains("url: string;"), "public member missing: {out}");
    assert!(
        out.contains("constructor(url: string, key: string);"),
        "constructor missing: {out}"
    );
    assert!(
        !out.lines().any(|l| l.trim() == "key: string;"),
        "private member leaked: {out}"
    );
}

#[test]
fn test_interface_and_type_alias_emission() {
    let src = "export interface Point { x: number; y: number }\nexport type ID = string | number;";
    let out = process_source(src, false, false);
    assert!(out.contains("export interface Point {"), "interface: {out}");
    assert!(out.contains("x: number;"), "member: {out}");
    assert!(out.contains("export type ID = string | number;"), "alias: {out}");
}

#[test]
fn test_namespace_round_trip() {
    let src = "export namespace Util {\n  export function clamp(n: number, lo: number, hi: number): number { return n }\n  export const EPSILON = 0.001\n}";
    let out = process_source(src, false, false);
    assert!(
        out.contains("export declare namespace Util {"),
        "envelope: {out}"
    );
    assert!(
        out.contains("  export function clamp(n: number, lo: number, hi: number): number;"),
        "inner function: {out}"
    );
    assert!(out.contains("  export const EPSILON: 0.001;"), "inner const: {out}");
}

#[test]
fn test_ambient_module_kept() {
    let src = "declare module 'virtual:config' {\n  export const mode: string\n}";
    let out = process_source(src, false, false);
    assert!(
        out.contains("declare module 'virtual:config' {"),
        "ambient module: {out}"
    );
    assert!(out.contains("  export const mode: string;"), "inner member: {out}");
}

#[test]
fn test_comments_kept_when_requested() {
    let src = "/** Greets. */\nexport function greet(): void {}";
    let with = process_source(src, true, false);
    let without = process_source(src, false, false);
    assert!(with.contains("/** Greets. */"), "comment lost: {with}");
    assert!(!without.contains("Greets"), "comment kept: {without}");
}

#[test]
fn test_default_value_jsdoc_round_trip() {
    let src = "export let options = { retries: 3, urls: ['a', 'b'] }";
    let out = process_source(src, true, false);
    assert!(out.contains("@defaultValue"), "tag missing: {out}");
    assert!(out.contains("retries: number;"), "widened type missing: {out}");
}

#[test]
fn test_mixed_file_end_to_end() {
    let src = r#"import { Logger } from './log';
import { unused } from './dead';

/// not a directive here

interface Options { verbose: boolean }

export function run(opts: Options, log: Logger): void {
  log.info('run');
}

export class Runner {
  private opts: Options;
  constructor(public name: string) {}
}

export default Runner;
"#;
    let out = process_source(src, false, false);
    assert!(out.contains("import { Logger } from './log';"), "import: {out}");
    assert!(!out.contains("unused"), "dead import kept: {out}");
    assert!(out.contains("interface Options {"), "pulled interface: {out}");
    assert!(
        out.contains("export declare function run(opts: Options, log: Logger): void;"),
        "function: {out}"
    );
    assert!(out.contains("export declare class Runner {"), "class: {out}");
    assert!(out.contains("name: string;"), "parameter property: {out}");
    assert!(out.trim_end().ends_with("export default Runner;"), "default last: {out}");
}
