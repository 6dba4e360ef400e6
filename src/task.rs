// 该文件是 Luoshen （洛神） 项目的一部分。
// src/task.rs - 推理任务
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use tracing::info;

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 单帧任务：推理一次，渲染一次，返回检测结果
pub struct OneShotTask;

impl<
  'a,
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  M: Model<Input = F, Output = D, Error = ME> + ?Sized,
  O: Render<F, D, Error = RE>,
> Task<&'a F, &'a M, &'a O> for OneShotTask
{
  type Output = D;
  type Error = anyhow::Error;

  fn run_task(
    self,
    frame: &'a F,
    model: &'a M,
    output: &'a O,
  ) -> Result<Self::Output, Self::Error> {
    info!("开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(frame)?;
    let inferred = now.elapsed();
    info!("推理完成，耗时: {:.2?}", inferred);
    output.render_result(frame, &result)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed() - inferred);

    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use std::cell::Cell;

  use super::*;

  struct Doubler;

  impl Model for Doubler {
    type Input = u32;
    type Output = u32;
    type Error = std::io::Error;

    fn infer(&self, input: &u32) -> Result<u32, std::io::Error> {
      Ok(input * 2)
    }
  }

  struct Failing;

  impl Model for Failing {
    type Input = u32;
    type Output = u32;
    type Error = std::io::Error;

    fn infer(&self, _: &u32) -> Result<u32, std::io::Error> {
      Err(std::io::Error::other("模型故障"))
    }
  }

  #[derive(Default)]
  struct Remember {
    seen: Cell<Option<(u32, u32)>>,
  }

  impl Render<u32, u32> for Remember {
    type Error = std::io::Error;

    fn render_result(&self, frame: &u32, result: &u32) -> Result<(), Self::Error> {
      self.seen.set(Some((*frame, *result)));
      Ok(())
    }
  }

  #[test]
  fn one_shot_renders_inference_result() {
    let output = Remember::default();
    let result = OneShotTask.run_task(&21, &Doubler, &output).unwrap();
    assert_eq!(result, 42);
    assert_eq!(output.seen.get(), Some((21, 42)));
  }

  #[test]
  fn model_failure_skips_rendering() {
    let output = Remember::default();
    let err = OneShotTask.run_task(&1, &Failing, &output).unwrap_err();
    assert!(err.to_string().contains("模型故障"));
    assert_eq!(output.seen.get(), None);
  }
}
