//! The built-in migration table for `server/storage.ts`.
//!
//! Two groups, applied in this order:
//!
//! - `db-query`: query start/finish/error diagnostics become `dbLogger`
//!   calls, then the now-unused `startTime`/`endTime` locals are deleted.
//! - `fifo`: inventory writeoff diagnostics become `inventoryLogger` calls
//!   with named context fields.
//!
//! Coupling inside `db-query` is declared with `after`: the timer deletions
//! must see text where nothing references `endTime - startTime` any more,
//! and `db-query-completed` calls the handle that `db-query-start` declares.
//! Every pattern matches only the `console.*` phrasing, so migrated text is
//! never matched again.

use crate::rules::table::RuleDef;

/// The default rule table, in application order.
pub fn builtin_rules() -> Vec<RuleDef> {
	let mut rules = db_query_rules();
	rules.extend(fifo_rules());
	rules
}

fn db_query_rules() -> Vec<RuleDef> {
	vec![
		RuleDef::new(
			"db-query-start",
			"console.log('[DB] Starting {{operation:'}} query{{:'}}');",
			"const endOperation = dbLogger.startOperation('${operation}');",
		)
		.note("declares the completion handle used by db-query-completed"),
		RuleDef::new(
			"db-query-completed",
			"console.log(`[DB] {{operation:`}} completed in ${endTime - startTime}ms{{:`}}`);",
			"endOperation();",
		)
		.after(&["db-query-start"])
		.note("the completion handle measures and logs the duration itself"),
		RuleDef::alternatives(
			"db-query-error",
			&[
				"console.error(`[DB] {{operation:`}} failed after ${endTime - startTime}ms:`, error);",
				"console.error('[DB] Error in {{operation:'}}:',{{_}}error);",
				"console.error(`[DB] {{operation:`}} error:`, error);",
			],
			"dbLogger.error('Error in ${operation}', { error: getErrorMessage(error) });",
		),
		RuleDef::new("drop-start-timer", "const startTime = Date.now();{{_}}", "")
			.after(&["db-query-completed", "db-query-error"])
			.note("startTime is unused once the timing logs are gone"),
		RuleDef::new("drop-end-timer", "const endTime = Date.now();{{_}}", "")
			.after(&["db-query-completed", "db-query-error"])
			.note("endTime is unused once the timing logs are gone"),
	]
}

fn fifo_rules() -> Vec<RuleDef> {
	vec![
		RuleDef::new(
			"fifo-writeoff-start",
			"console.log(`🔄 FIFO-списание товара ${productId}, количество: ${quantityToWriteoff}`);",
			"inventoryLogger.info('Starting FIFO writeoff', { productId, quantity: quantityToWriteoff });",
		),
		RuleDef::new(
			"fifo-stock-found",
			"console.log(`📦 Найдено приходов: ${availableStock.length}`);",
			"inventoryLogger.debug('Found incoming stock batches', { count: availableStock.length });",
		),
		RuleDef::new(
			"fifo-batch-writeoff",
			"console.log(`📤 Списано ${quantityToTakeFromThisBatch} из партии ${stockItem.id}, остается списать: ${remainingToWriteoff}`);",
			"inventoryLogger.debug('Writing off from batch', { batchId: stockItem.id, quantity: quantityToTakeFromThisBatch, remaining: remainingToWriteoff });",
		),
		RuleDef::new(
			"fifo-negative-writeoff",
			"console.log(`⚠️ Списание в минус: ${remainingToWriteoff} единиц`);",
			"inventoryLogger.warn('Negative inventory writeoff', { negativeQuantity: remainingToWriteoff });",
		),
		RuleDef::new(
			"fifo-writeoff-completed",
			"console.log(`✅ FIFO-списание завершено`);",
			"inventoryLogger.info('FIFO writeoff completed');",
		),
	]
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rewrite::{Limits, rewrite};
	use crate::rules::table::RuleTable;

	fn table() -> RuleTable {
		RuleTable::compile(builtin_rules(), &Limits::default()).unwrap()
	}

	fn apply(text: &str) -> String {
		rewrite(&table(), text, &Limits::default()).unwrap().text
	}

	#[test]
	fn test_builtin_table_compiles() {
		let table = table();
		assert_eq!(table.len(), 10);
		assert_eq!(table.rules()[0].name, "db-query-start");
	}

	#[test]
	fn test_query_start() {
		assert_eq!(
			apply("console.log('[DB] Starting getUser query...');"),
			"const endOperation = dbLogger.startOperation('getUser');"
		);
	}

	#[test]
	fn test_query_completed_calls_handle() {
		assert_eq!(
			apply("console.log(`[DB] getUser completed in ${endTime - startTime}ms, rows: ${rows.length}`);"),
			"endOperation();"
		);
	}

	#[test]
	fn test_error_phrasings_share_one_output() {
		let expected = "dbLogger.error('Error in getUser', { error: getErrorMessage(error) });";
		assert_eq!(
			apply("console.error(`[DB] getUser failed after ${endTime - startTime}ms:`, error);"),
			expected
		);
		assert_eq!(apply("console.error('[DB] Error in getUser:', error);"), expected);
		assert_eq!(apply("console.error('[DB] Error in getUser:',\n  error);"), expected);
		assert_eq!(apply("console.error(`[DB] getUser error:`, error);"), expected);
	}

	#[test]
	fn test_timer_deletion_leaves_no_blank_line() {
		let input = "  const startTime = Date.now();\n  try {\n    const endTime = Date.now();\n    return x;\n";
		assert_eq!(apply(input), "  try {\n    return x;\n");
	}

	#[test]
	fn test_fifo_writeoff_uses_named_fields() {
		let out = apply(
			"console.log(`🔄 FIFO-списание товара ${productId}, количество: ${quantityToWriteoff}`);",
		);
		assert_eq!(
			out,
			"inventoryLogger.info('Starting FIFO writeoff', { productId, quantity: quantityToWriteoff });"
		);
	}

	#[test]
	fn test_fifo_batch_and_warning() {
		assert_eq!(
			apply("console.log(`⚠️ Списание в минус: ${remainingToWriteoff} единиц`);"),
			"inventoryLogger.warn('Negative inventory writeoff', { negativeQuantity: remainingToWriteoff });"
		);
		assert_eq!(
			apply("console.log(`✅ FIFO-списание завершено`);"),
			"inventoryLogger.info('FIFO writeoff completed');"
		);
		assert!(
			apply("console.log(`📦 Найдено приходов: ${availableStock.length}`);")
				.starts_with("inventoryLogger.debug('Found incoming stock batches'")
		);
	}

	#[test]
	fn test_whole_method_migration() {
		let input = r#"  async getUser(id: number) {
    console.log('[DB] Starting getUser query...');
    const startTime = Date.now();
    try {
      const result = await db.select().from(users).where(eq(users.id, id));
      const endTime = Date.now();
      console.log(`[DB] getUser completed in ${endTime - startTime}ms`);
      return result[0];
    } catch (error) {
      const endTime = Date.now();
      console.error(`[DB] getUser failed after ${endTime - startTime}ms:`, error);
      throw error;
    }
  }
"#;
		let expected = r#"  async getUser(id: number) {
    const endOperation = dbLogger.startOperation('getUser');
    try {
      const result = await db.select().from(users).where(eq(users.id, id));
      endOperation();
      return result[0];
    } catch (error) {
      dbLogger.error('Error in getUser', { error: getErrorMessage(error) });
      throw error;
    }
  }
"#;
		let once = apply(input);
		assert_eq!(once, expected);
		assert_eq!(apply(&once), once);
	}
}
